//! Execution configuration message embedded in every parameters message.

/// Executable-runtime adapter active at generation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WrapperKind {
    /// No adapter-specific configuration.
    #[default]
    Generic,
    /// Python wrapper: interpreter and virtualenv settings.
    Python,
}

impl WrapperKind {
    /// Resolve the wrapper selector (the `WRAPPER` environment variable).
    /// Unrecognized or absent values select [`WrapperKind::Generic`].
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            Some("python-wrapper") => WrapperKind::Python,
            _ => WrapperKind::Generic,
        }
    }

    fn extension_fields(self) -> &'static [ConfigField] {
        match self {
            WrapperKind::Generic => &[],
            WrapperKind::Python => PYTHON_FIELDS,
        }
    }
}

/// A single field of the `Config` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    pub name: &'static str,
    pub ty: &'static str,
    pub tag: u32,
}

const fn field(name: &'static str, ty: &'static str, tag: u32) -> ConfigField {
    ConfigField { name, ty, tag }
}

// Tags are grouped: 10s process, 100s remote execution, 200s result
// handling, 300s wrapper-specific.
const BASE_FIELDS: &[ConfigField] = &[
    field("env", "map<string, string>", 10),
    field("cwd", "string", 11),
    field("base_dir", "string", 12),
    field("stdin", "string", 13),
    field("sudo", "bool", 14),
    field("sudo_user", "string", 15),
    field("sudo_password", "string", 16),
    field("ssh_host", "string", 100),
    field("ssh_port", "int32", 101),
    field("ssh_user", "string", 102),
    field("ssh_privatekey", "string", 103),
    field("exclude_results", "repeated string", 200),
];

const PYTHON_FIELDS: &[ConfigField] = &[
    field("py_version", "string", 300),
    field("py_virtualenv", "string", 301),
    field("py_requirements", "string", 302),
    field("py_install_requirements", "bool", 303),
];

/// The `Config` message for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMessage {
    pub wrapper: WrapperKind,
    pub fields: Vec<ConfigField>,
}

impl ConfigMessage {
    /// Base execution fields plus the extension fields of `wrapper`.
    pub fn for_wrapper(wrapper: WrapperKind) -> Self {
        let fields = BASE_FIELDS
            .iter()
            .chain(wrapper.extension_fields())
            .copied()
            .collect();
        Self { wrapper, fields }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_selector() {
        assert_eq!(
            WrapperKind::from_selector(Some("python-wrapper")),
            WrapperKind::Python
        );
        assert_eq!(
            WrapperKind::from_selector(Some("ruby-wrapper")),
            WrapperKind::Generic
        );
        assert_eq!(WrapperKind::from_selector(Some("")), WrapperKind::Generic);
        assert_eq!(WrapperKind::from_selector(None), WrapperKind::Generic);
    }

    #[test]
    fn test_generic_config_has_base_fields_only() {
        let config = ConfigMessage::for_wrapper(WrapperKind::Generic);
        assert_eq!(config.fields.len(), BASE_FIELDS.len());
        assert!(config.fields.iter().all(|f| !f.name.starts_with("py_")));
        assert_eq!(config.fields.last().unwrap().name, "exclude_results");
    }

    #[test]
    fn test_python_config_extends_base_fields() {
        let config = ConfigMessage::for_wrapper(WrapperKind::Python);
        let names: Vec<_> = config.fields.iter().map(|f| f.name).collect();
        assert_eq!(
            &names[BASE_FIELDS.len()..],
            [
                "py_version",
                "py_virtualenv",
                "py_requirements",
                "py_install_requirements"
            ]
        );
        assert_eq!(config.fields.last().unwrap().tag, 303);
    }

    #[test]
    fn test_tags_are_unique_and_increasing() {
        let config = ConfigMessage::for_wrapper(WrapperKind::Python);
        assert!(config.fields.windows(2).all(|w| w[0].tag < w[1].tag));
    }
}
