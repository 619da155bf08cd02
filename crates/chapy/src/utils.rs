use serde::Serialize;

/// 指定幅のインデントで整形したJSON
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T, indent: usize) -> anyhow::Result<String> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

/// カンマ区切りのステージ指定を分割
pub fn split_stages(stages: &str) -> Vec<String> {
    stages
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
