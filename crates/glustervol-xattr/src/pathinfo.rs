//! Parser for the `trusted.glusterfs.pathinfo` virtual extended attribute.
//!
//! The attribute describes the translator graph serving one file as a
//! parenthesised tree. Cluster translators open a group and carry a header;
//! bricks are leaves naming the server that stores the bytes:
//!
//! ```text
//! (<DISTRIBUTE:vol-dht> (<REPLICATE:vol-replicate-0>
//!     <POSIX(/bricks/b1):server1:/bricks/b1/data/a.txt>
//!     <POSIX(/bricks/b1):server2:/bricks/b1/data/a.txt>))
//! ```
//!
//! Stripe translators append their stripe size: `<STRIPE:vol-stripe-0:[131072]>`.

use crate::error::{AttrError, Result};

/// Attribute name the storage layer answers pathinfo queries on.
pub const PATHINFO_XATTR: &str = "trusted.glusterfs.pathinfo";

const LEAF_PREFIX: &str = "POSIX(";

/// Kind of a cluster translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterKind {
    /// Hash-distributes whole files over its children.
    Distribute,
    /// Keeps a full copy of the file on every child.
    Replicate,
    /// Spreads fixed-size stripe units round-robin over its children.
    Stripe {
        /// Stripe unit in bytes.
        size: u64,
    },
    /// Erasure-codes the file over its children.
    Disperse,
    /// Any translator this parser has no special knowledge of.
    Other(String),
}

impl ClusterKind {
    fn parse(kind: &str, size: Option<u64>) -> Self {
        match (kind.to_ascii_uppercase().as_str(), size) {
            ("DISTRIBUTE", _) => ClusterKind::Distribute,
            ("REPLICATE", _) => ClusterKind::Replicate,
            ("STRIPE", Some(size)) => ClusterKind::Stripe { size },
            ("DISPERSE", _) => ClusterKind::Disperse,
            _ => ClusterKind::Other(kind.to_string()),
        }
    }
}

/// Storage brick holding (part of) a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brick {
    /// Brick export directory on the server.
    pub export: String,
    /// Server host name.
    pub host: String,
    /// Backend path of the file on the brick.
    pub path: String,
}

/// Node of a parsed translator tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translator {
    /// A cluster translator and the subvolumes below it.
    Cluster {
        /// Translator kind.
        kind: ClusterKind,
        /// Translator instance name, e.g. `vol-replicate-0`.
        name: String,
        /// Subvolumes in graph order.
        children: Vec<Translator>,
    },
    /// A storage brick.
    Brick(Brick),
}

impl Translator {
    /// Hosts of every brick below this node, in graph order, without duplicates.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts = Vec::new();
        self.collect_hosts(&mut hosts);
        hosts
    }

    fn collect_hosts(&self, out: &mut Vec<String>) {
        match self {
            Translator::Brick(brick) => {
                if !out.contains(&brick.host) {
                    out.push(brick.host.clone());
                }
            }
            Translator::Cluster { children, .. } => {
                for child in children {
                    child.collect_hosts(out);
                }
            }
        }
    }

    /// First stripe translator in depth-first order, with its stripe size and members.
    pub fn find_stripe(&self) -> Option<(u64, &[Translator])> {
        match self {
            Translator::Brick(_) => None,
            Translator::Cluster {
                kind: ClusterKind::Stripe { size },
                children,
                ..
            } => Some((*size, children.as_slice())),
            Translator::Cluster { children, .. } => {
                children.iter().find_map(|child| child.find_stripe())
            }
        }
    }
}

/// Parses a raw pathinfo attribute value.
///
/// Trailing NUL bytes and surrounding whitespace are ignored.
pub fn parse(raw: &[u8]) -> Result<Translator> {
    let text = std::str::from_utf8(raw).map_err(|e| AttrError::Malformed {
        position: e.valid_up_to(),
        reason: "value is not valid UTF-8".to_string(),
    })?;
    let text = text.trim_end_matches('\0');

    let mut parser = Parser {
        input: text,
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let tree = parser.node()?;
    parser.skip_ws();
    if parser.pos != parser.input.len() {
        return Err(parser.error("trailing data after translator tree"));
    }
    Ok(tree)
}

/// Deepest group nesting accepted. Real volume graphs stay in single digits.
pub const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn error(&self, reason: &str) -> AttrError {
        AttrError::Malformed {
            position: self.pos,
            reason: reason.to_string(),
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn node(&mut self) -> Result<Translator> {
        match self.peek() {
            Some('(') => self.group(),
            Some('<') => {
                let body = self.angle()?;
                self.leaf(body)
            }
            _ => Err(self.error("expected '(' or '<'")),
        }
    }

    fn group(&mut self) -> Result<Translator> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("translator tree nested too deeply"));
        }
        self.expect('(')?;
        self.depth += 1;
        let group = self.group_body();
        self.depth -= 1;
        group
    }

    fn group_body(&mut self) -> Result<Translator> {
        self.skip_ws();

        let mut kind = ClusterKind::Other(String::new());
        let mut name = String::new();
        let mut children = Vec::new();

        if self.peek() == Some('<') && !self.rest()[1..].starts_with(LEAF_PREFIX) {
            let start = self.pos;
            let body = self.angle()?;
            let (k, n) = header(body).map_err(|reason| AttrError::Malformed {
                position: start,
                reason,
            })?;
            kind = k;
            name = n;
        }

        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => children.push(self.node()?),
                None => return Err(self.error("unterminated group")),
            }
        }

        Ok(Translator::Cluster {
            kind,
            name,
            children,
        })
    }

    /// Consumes `<...>` and returns the text between the brackets.
    fn angle(&mut self) -> Result<&'a str> {
        self.expect('<')?;
        let rest = self.rest();
        let end = rest.find('>').ok_or_else(|| self.error("expected '>'"))?;
        self.pos += end + 1;
        Ok(&rest[..end])
    }

    fn leaf(&self, body: &str) -> Result<Translator> {
        let inner = body
            .strip_prefix(LEAF_PREFIX)
            .ok_or_else(|| self.error("expected a POSIX brick"))?;
        let (export, rest) = inner
            .split_once("):")
            .ok_or_else(|| self.error("brick export not closed"))?;
        let (host, path) = rest
            .split_once(':')
            .ok_or_else(|| self.error("brick host not followed by a path"))?;
        if host.is_empty() {
            return Err(self.error("brick host is empty"));
        }
        Ok(Translator::Brick(Brick {
            export: export.to_string(),
            host: host.to_string(),
            path: path.to_string(),
        }))
    }
}

fn header(body: &str) -> std::result::Result<(ClusterKind, String), String> {
    let (kind, rest) = body
        .split_once(':')
        .ok_or_else(|| format!("translator header {:?} has no name", body))?;

    let (name, size) = match rest.rsplit_once(":[") {
        Some((name, tail)) => {
            let digits = tail
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated size in header {:?}", body))?;
            let size = digits
                .parse::<u64>()
                .map_err(|e| format!("bad size {:?}: {}", digits, e))?;
            (name, Some(size))
        }
        None => (rest, None),
    };

    if kind.eq_ignore_ascii_case("STRIPE") && size.is_none() {
        return Err(format!("stripe header {:?} has no stripe size", body));
    }

    Ok((ClusterKind::parse(kind, size), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLICATED: &str = "(<DISTRIBUTE:vol-dht> (<REPLICATE:vol-replicate-0> \
        <POSIX(/bricks/b1):h1:/bricks/b1/data/a.txt> \
        <POSIX(/bricks/b1):h2:/bricks/b1/data/a.txt>))";

    const STRIPED: &str = "(<DISTRIBUTE:vol-dht> (<STRIPE:vol-stripe-0:[131072]> \
        (<REPLICATE:vol-replicate-0> <POSIX(/b1):h1:/b1/f> <POSIX(/b1):h2:/b1/f>) \
        (<REPLICATE:vol-replicate-1> <POSIX(/b2):h3:/b2/f> <POSIX(/b2):h4:/b2/f>)))";

    #[test]
    fn test_parse_replicated() {
        let tree = parse(REPLICATED.as_bytes()).unwrap();
        assert_eq!(tree.hosts(), vec!["h1", "h2"]);
        assert!(tree.find_stripe().is_none());

        match tree {
            Translator::Cluster { kind, name, children } => {
                assert_eq!(kind, ClusterKind::Distribute);
                assert_eq!(name, "vol-dht");
                assert_eq!(children.len(), 1);
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_parse_striped() {
        let tree = parse(STRIPED.as_bytes()).unwrap();
        let (size, members) = tree.find_stripe().unwrap();
        assert_eq!(size, 131072);
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].hosts(), vec!["h3", "h4"]);
    }

    #[test]
    fn test_parse_single_brick() {
        let tree = parse(b"<POSIX(/export):node7:/export/x>").unwrap();
        assert_eq!(
            tree,
            Translator::Brick(Brick {
                export: "/export".to_string(),
                host: "node7".to_string(),
                path: "/export/x".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_group_without_header() {
        let tree = parse(b"(<POSIX(/e):a:/e/x> <POSIX(/e):b:/e/x>)").unwrap();
        assert_eq!(tree.hosts(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_ignores_trailing_nul() {
        let mut raw = REPLICATED.as_bytes().to_vec();
        raw.push(0);
        assert!(parse(&raw).is_ok());
    }

    #[test]
    fn test_backend_path_may_contain_colons() {
        let tree = parse(b"<POSIX(/e):h:/e/a:b:c>").unwrap();
        match tree {
            Translator::Brick(brick) => assert_eq!(brick.path, "/e/a:b:c"),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_hosts_deduplicated() {
        let tree = parse(b"(<DISTRIBUTE:d> <POSIX(/a):h1:/a/f> <POSIX(/b):h1:/b/f>)").unwrap();
        assert_eq!(tree.hosts(), vec!["h1"]);
    }

    #[test]
    fn test_unknown_translator_kind() {
        let tree = parse(b"(<SHARD:vol-shard> <POSIX(/a):h:/a/f>)").unwrap();
        match tree {
            Translator::Cluster { kind, .. } => {
                assert_eq!(kind, ClusterKind::Other("SHARD".to_string()))
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_group_is_malformed() {
        let err = parse(b"(<DISTRIBUTE:d> <POSIX(/a):h:/a/f>").unwrap_err();
        assert!(matches!(err, AttrError::Malformed { .. }));
    }

    #[test]
    fn test_stripe_without_size_is_malformed() {
        let err = parse(b"(<STRIPE:s> <POSIX(/a):h:/a/f>)").unwrap_err();
        assert!(matches!(err, AttrError::Malformed { .. }));
    }

    #[test]
    fn test_trailing_garbage_is_malformed() {
        let err = parse(b"<POSIX(/a):h:/a/f> junk").unwrap_err();
        assert!(matches!(err, AttrError::Malformed { .. }));
    }

    #[test]
    fn test_empty_value_is_malformed() {
        assert!(parse(b"").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = parse(&[b'(', 0xff, b')']).unwrap_err();
        assert!(matches!(err, AttrError::Malformed { position: 1, .. }));
    }

    fn nested(depth: usize) -> String {
        format!(
            "{}<POSIX(/b):h1:/b/f>{}",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    }

    #[test]
    fn test_deep_nesting_is_malformed() {
        let err = parse(&vec![b'('; 60_000]).unwrap_err();
        assert!(matches!(err, AttrError::Malformed { position: MAX_DEPTH, .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let tree = parse(nested(MAX_DEPTH).as_bytes()).unwrap();
        assert_eq!(tree.hosts(), vec!["h1"]);
        assert!(parse(nested(MAX_DEPTH + 1).as_bytes()).is_err());
    }
}
