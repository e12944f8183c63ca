//! SSH client configuration scanning.
//!
//! Only the subset of `~/.ssh/config` that matters for reaching a daemon is
//! recognized: `HostName`, `Port`, `User`, `IdentityFile`. Matching is exact
//! against the `Host` pattern (no globbing), and only the first matching
//! block is honored — later blocks are not merged in.

use std::path::Path;

/// Connection parameters extracted from one `Host` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshHostEntry {
    pub host_name: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub identity_file: Option<String>,
}

/// Read the conventional per-user SSH config, if present.
///
/// A missing or unreadable file is not an error — lookups simply degrade to
/// the bare host name.
pub fn load_ssh_config(home: &Path) -> Option<String> {
    let path = home.join(".ssh/config");
    match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!("No usable SSH config at {}: {}", path.display(), e);
            None
        }
    }
}

/// Scan `config` for the first `Host` block whose pattern equals `host`
/// verbatim, collecting the recognized directives within it.
///
/// Returns an empty entry when no block matches.
pub fn lookup_host(config: &str, host: &str, home: &Path) -> SshHostEntry {
    let mut entry = SshHostEntry::default();
    let mut in_target = false;

    for line in config.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = split_directive(trimmed) else {
            continue;
        };

        if key.eq_ignore_ascii_case("host") {
            if in_target {
                // First matching block wins; stop at the next block.
                break;
            }
            in_target = value == host;
            continue;
        }

        if !in_target {
            continue;
        }

        if key.eq_ignore_ascii_case("hostname") {
            entry.host_name = Some(value.to_string());
        } else if key.eq_ignore_ascii_case("port") {
            // Non-numeric ports are a silent no-op.
            if let Ok(port) = value.parse::<u16>() {
                entry.port = Some(port);
            }
        } else if key.eq_ignore_ascii_case("user") {
            entry.user = Some(value.to_string());
        } else if key.eq_ignore_ascii_case("identityfile") {
            entry.identity_file = Some(expand_identity_path(value, home));
        }
        // Any other directive is ignored.
    }

    entry
}

/// Split an `ssh_config` directive into key and value. Both `Key value` and
/// `Key=value` forms appear in the wild.
fn split_directive(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line
        .split_once(|c: char| c.is_whitespace() || c == '=')
        .map(|(k, v)| (k, v.trim_start_matches(['=', ' ', '\t']).trim()))?;
    if value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Strip surrounding quotes and expand a leading `~` to the home directory.
fn expand_identity_path(raw: &str, home: &Path) -> String {
    let unquoted = raw.trim_matches(|c| c == '"' || c == '\'');
    if let Some(rest) = unquoted.strip_prefix('~') {
        format!("{}{}", home.display(), rest)
    } else {
        unquoted.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn home() -> PathBuf {
        PathBuf::from("/home/tester")
    }

    #[test]
    fn matching_block_yields_all_directives() {
        let config = "\
Host my-vm
    HostName 10.0.0.5
    User ubuntu
    Port 2222
    IdentityFile ~/.ssh/id_ed25519
";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.host_name.as_deref(), Some("10.0.0.5"));
        assert_eq!(entry.user.as_deref(), Some("ubuntu"));
        assert_eq!(entry.port, Some(2222));
        assert_eq!(
            entry.identity_file.as_deref(),
            Some("/home/tester/.ssh/id_ed25519")
        );
    }

    #[test]
    fn no_matching_block_yields_empty_entry() {
        let config = "Host other\n    HostName 1.2.3.4\n";
        assert_eq!(lookup_host(config, "my-vm", &home()), SshHostEntry::default());
    }

    #[test]
    fn match_is_exact_not_glob() {
        let config = "Host *\n    User everyone\n";
        assert_eq!(lookup_host(config, "my-vm", &home()), SshHostEntry::default());
    }

    #[test]
    fn first_matching_block_wins() {
        let config = "\
Host my-vm
    User first
Host my-vm
    User second
    Port 9999
";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.user.as_deref(), Some("first"));
        assert_eq!(entry.port, None);
    }

    #[test]
    fn directive_keys_are_case_insensitive() {
        let config = "Host my-vm\n    HOSTNAME box\n    user dev\n    PORT 2200\n";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.host_name.as_deref(), Some("box"));
        assert_eq!(entry.user.as_deref(), Some("dev"));
        assert_eq!(entry.port, Some(2200));
    }

    #[test]
    fn non_numeric_port_is_ignored() {
        let config = "Host my-vm\n    Port not-a-port\n    User dev\n";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.port, None);
        assert_eq!(entry.user.as_deref(), Some("dev"));
    }

    #[test]
    fn identity_file_quotes_are_stripped() {
        let config = "Host my-vm\n    IdentityFile \"/keys/id rsa\"\n";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.identity_file.as_deref(), Some("/keys/id rsa"));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let config = "# global\n\nHost my-vm\n    # inline note\n    User dev\n";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.user.as_deref(), Some("dev"));
    }

    #[test]
    fn directives_outside_any_block_are_ignored() {
        let config = "User global\nHost my-vm\n    Port 2222\n";
        let entry = lookup_host(config, "my-vm", &home());
        assert_eq!(entry.user, None);
        assert_eq!(entry.port, Some(2222));
    }
}
