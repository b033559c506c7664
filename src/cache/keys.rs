/// 访问计数缓存键前缀
const VISIT_COUNT_PREFIX: &str = "visit:count:";

/// 生成访问计数缓存键，读取与失效两条路径必须使用同一个键
pub fn visit_count_key(ip: &str) -> String {
    format!("{}{}", VISIT_COUNT_PREFIX, ip)
}
