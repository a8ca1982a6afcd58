//! Command dispatch for the management surface.

use crate::connlimit::ConnlimitView;

/// Routes one command line to the view that owns it.
#[derive(Debug, Clone)]
pub struct Management {
    connlimit: ConnlimitView,
}

impl Management {
    pub fn new(connlimit: ConnlimitView) -> Self {
        Self { connlimit }
    }

    /// Execute `line` and return the reply. Every reply line ends in `\r\n`.
    pub fn execute(&self, line: &str) -> String {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let mut out = String::new();

        match fields.first().copied() {
            None => {}
            Some("connlimit") => self.connlimit.execute(&fields, &mut out),
            Some("help") => Self::help(&mut out),
            Some(_) => {
                out.push_str("unknown command\r\n");
                Self::help(&mut out);
            }
        }
        out
    }

    pub fn help(out: &mut String) {
        ConnlimitView::help(out);
        out.push_str("help - show this help\r\n");
        out.push_str("exit - close the session\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connlimit::{ConnLimiter, LimitSettings};
    use std::sync::Arc;

    fn management() -> (Management, Arc<ConnLimiter>) {
        let limiter = Arc::new(ConnLimiter::new(LimitSettings::default()));
        (
            Management::new(ConnlimitView::new(Arc::clone(&limiter))),
            limiter,
        )
    }

    #[test]
    fn test_unknown_command_lists_help() {
        let (mgmt, _) = management();
        let reply = mgmt.execute("shutdown now");
        assert!(reply.starts_with("unknown command\r\n"));
        assert!(reply.contains("connlimit show"));
    }

    #[test]
    fn test_connlimit_routed_to_view() {
        let (mgmt, limiter) = management();
        limiter.check(crate::connlimit::IdentityKey::from_raw(9)).unwrap();

        let reply = mgmt.execute("connlimit show");
        assert_eq!(reply.lines().count(), 3);

        assert_eq!(mgmt.execute("connlimit flush all"), "");
        assert!(limiter.is_empty());
        assert_eq!(mgmt.execute("connlimit flush ip 1.2.3"), "invalid format\r\n");
    }

    #[test]
    fn test_blank_line_is_silent() {
        let (mgmt, _) = management();
        assert_eq!(mgmt.execute("   "), "");
        assert!(mgmt.execute("help").ends_with("exit - close the session\r\n"));
    }
}
