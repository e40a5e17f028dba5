use std::env;
use std::fmt;
use std::fs;

/// Host platform, as far as log collection cares
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    Linux { name: String, wsl: bool },
    Windows,
    Unsupported(String),
}

impl Platform {
    pub fn detect() -> Self {
        match env::consts::OS {
            "linux" => Self::Linux {
                name: fs::read_to_string("/etc/os-release")
                    .ok()
                    .and_then(|content| os_release_name(&content))
                    .unwrap_or_else(|| "Linux".to_string()),
                wsl: is_wsl(
                    env::var("WSL_DISTRO_NAME").ok().as_deref(),
                    fs::read_to_string("/proc/version").ok().as_deref(),
                ),
            },
            "windows" => Self::Windows,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux { name, wsl: true } => write!(f, "{name} (WSL)"),
            Self::Linux { name, .. } => f.write_str(name),
            Self::Windows => f.write_str("Windows"),
            Self::Unsupported(os) => f.write_str(os),
        }
    }
}

/// `PRETTY_NAME`, falling back to `NAME`
fn os_release_name(content: &str) -> Option<String> {
    let value = |key: &str| {
        content.lines().find_map(|line| {
            let (k, v) = line.split_once('=')?;
            let v = v.trim().trim_matches('"').trim_matches('\'');
            (k.trim() == key && !v.is_empty()).then(|| v.to_string())
        })
    };
    value("PRETTY_NAME").or_else(|| value("NAME"))
}

fn is_wsl(distro: Option<&str>, proc_version: Option<&str>) -> bool {
    distro.is_some_and(|d| !d.is_empty())
        || proc_version.is_some_and(|v| v.to_lowercase().contains("microsoft"))
}
