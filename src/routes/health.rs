/// 存活检查，不访问数据库和缓存
pub async fn health() -> &'static str {
    "OK"
}
