use crate::error::{MemoryError, MemoryResult};

/// Fact partition reserved for platform-wide facts. Not a valid agent name.
pub const SHARED_PARTITION: &str = "_shared";

/// Validate an agent identity and return it trimmed.
///
/// Agent names become directory names and index key prefixes, so path
/// separators, `..`, NUL, `:` and a leading `.` are rejected.
pub fn validate_agent(agent: &str) -> MemoryResult<&str> {
    let id = agent.trim();
    if id.is_empty() {
        return Err(MemoryError::InvalidAgent(agent.to_string()));
    }
    if id.contains('/')
        || id.contains('\\')
        || id.contains("..")
        || id.contains('\0')
        || id.contains(':')
        || id.starts_with('.')
    {
        return Err(MemoryError::InvalidAgent(agent.to_string()));
    }
    if id == SHARED_PARTITION {
        return Err(MemoryError::InvalidAgent(agent.to_string()));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_agents() {
        assert_eq!(validate_agent("Cynix").unwrap(), "Cynix");
        assert_eq!(validate_agent("  Nova ").unwrap(), "Nova");
        assert_eq!(validate_agent("agent-7_b").unwrap(), "agent-7_b");
    }

    #[test]
    fn test_rejected_agents() {
        for bad in ["", "   ", "../etc", "a/b", "a\\b", "a:b", ".hidden", "_shared"] {
            assert!(
                matches!(validate_agent(bad), Err(MemoryError::InvalidAgent(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
