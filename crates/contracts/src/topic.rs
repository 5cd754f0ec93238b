//! Topic name rules
//!
//! Names follow the ROS conventions: `/`-separated segments of
//! `[A-Za-z0-9_]`, with an optional leading `/` or `~`.

use crate::ContractError;

/// Validate a topic name
pub fn validate_topic_name(name: &str) -> Result<(), ContractError> {
    if name.is_empty() {
        return Err(ContractError::invalid_topic(name, "name is empty"));
    }

    let body = name
        .strip_prefix('~')
        .map(|rest| rest.strip_prefix('/').unwrap_or(rest))
        .or_else(|| name.strip_prefix('/'))
        .unwrap_or(name);

    if body.is_empty() {
        return Err(ContractError::invalid_topic(name, "name has no segments"));
    }
    if body.ends_with('/') {
        return Err(ContractError::invalid_topic(name, "name ends with '/'"));
    }

    for segment in body.split('/') {
        if segment.is_empty() {
            return Err(ContractError::invalid_topic(name, "empty segment"));
        }
        if segment.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(ContractError::invalid_topic(
                name,
                format!("segment '{segment}' starts with a digit"),
            ));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(ContractError::invalid_topic(
                name,
                format!("invalid character '{c}'"),
            ));
        }
    }

    Ok(())
}

/// Resolve a topic name against the root namespace
///
/// `drone/odom` becomes `/drone/odom`, absolute names are kept,
/// `~/x` expands under the node name.
pub fn resolve_topic_name(name: &str, node_name: &str) -> Result<String, ContractError> {
    validate_topic_name(name)?;

    if let Some(rest) = name.strip_prefix('~') {
        let rest = rest.trim_start_matches('/');
        return Ok(format!("/{node_name}/{rest}"));
    }
    if name.starts_with('/') {
        return Ok(name.to_string());
    }
    Ok(format!("/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_topic_name("drone/odom").is_ok());
        assert!(validate_topic_name("/vl53l1x/range").is_ok());
        assert!(validate_topic_name("~/debug").is_ok());
        assert!(validate_topic_name("scan_2").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_topic_name("").is_err());
        assert!(validate_topic_name("/").is_err());
        assert!(validate_topic_name("drone//odom").is_err());
        assert!(validate_topic_name("drone/odom/").is_err());
        assert!(validate_topic_name("drone/2odom").is_err());
        assert!(validate_topic_name("drone odom").is_err());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve_topic_name("drone/odom", "fake_sensor").unwrap(),
            "/drone/odom"
        );
        assert_eq!(
            resolve_topic_name("/vl53l1x/range", "fake_sensor").unwrap(),
            "/vl53l1x/range"
        );
        assert_eq!(
            resolve_topic_name("~/debug", "fake_sensor").unwrap(),
            "/fake_sensor/debug"
        );
    }
}
