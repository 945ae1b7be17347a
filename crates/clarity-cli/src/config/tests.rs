#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.history.max_entries, 10);
        assert_eq!(config.knowledge_base.path, PathBuf::from("data/knowledge_base.json"));
        assert_eq!(
            config.knowledge_base.extra_aliases.get("total_cholesterol"),
            Some(&vec!["cholesterol".to_string()])
        );
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
[knowledge_base]
path = "/srv/clarity/kb.yaml"

[history]
max_entries = 3
"#,
        )
        .unwrap();
        assert_eq!(config.knowledge_base.path, PathBuf::from("/srv/clarity/kb.yaml"));
        assert_eq!(config.history.max_entries, 3);
        assert_eq!(config.history.path, default_history_path());
        assert_eq!(config.logging.filter, default_log_filter());
    }

    #[test]
    fn test_extra_aliases_override_default() {
        let config = Config::parse(
            r#"
[knowledge_base.extra_aliases]
hemoglobin = ["hgb", "haemoglobin"]
"#,
        )
        .unwrap();
        assert!(config.knowledge_base.extra_aliases.get("total_cholesterol").is_none());
        assert_eq!(config.knowledge_base.extra_aliases["hemoglobin"].len(), 2);
    }

    #[test]
    fn test_zero_history_rejected() {
        assert!(Config::parse("[history]\nmax_entries = 0\n").is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here/clarity.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
