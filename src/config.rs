use crate::graph::GraphOptions;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server settings.
///
/// Defaults can be overridden by positional arguments:
/// `website [addr] [static_dir]`.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,

    /// Directory served under `/static`
    pub static_dir: PathBuf,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Chart size and labels used for the page and the slide
    pub graph: GraphOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 10 * 1024 * 1024,
            graph: GraphOptions::default(),
        }
    }
}

impl Config {
    /// Build from command-line arguments (program name excluded).
    /// Unparsable values fall back to the default.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut config = Config::default();
        let mut args = args.into_iter();

        if let Some(addr) = args.next() {
            match addr.parse() {
                Ok(addr) => config.addr = addr,
                Err(_) => log::warn!("ignoring invalid address '{}', using {}", addr, config.addr),
            }
        }
        if let Some(dir) = args.next() {
            config.static_dir = PathBuf::from(dir);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_override_defaults() {
        let config = Config::from_args(vec!["0.0.0.0:8080".to_string(), "assets".to_string()]);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.static_dir, PathBuf::from("assets"));

        let config = Config::from_args(vec!["not-an-addr".to_string()]);
        assert_eq!(config.addr.port(), 3000);
    }
}
