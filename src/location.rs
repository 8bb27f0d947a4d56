use crate::{Error, Result};

/// A parsed page URL. Only hierarchical (`scheme://authority/path`) URLs are
/// accepted; a book page is always served from somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocationParts {
    scheme: String,
    hostname: String,
    port: String,
    pathname: String,
    search: String,
    hash: String,
}

impl LocationParts {
    pub(crate) fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidUrl(input.to_string());
        let trimmed = input.trim();
        let scheme_end = trimmed.find(':').ok_or_else(invalid)?;
        let scheme = trimmed[..scheme_end].to_ascii_lowercase();
        if !is_valid_url_scheme(&scheme) {
            return Err(invalid());
        }
        let without_slashes = trimmed[scheme_end + 1..]
            .strip_prefix("//")
            .ok_or_else(invalid)?;
        let authority_end = without_slashes
            .find(['/', '?', '#'])
            .unwrap_or(without_slashes.len());
        let authority = &without_slashes[..authority_end];
        let tail = &without_slashes[authority_end..];

        let hostport = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        let (hostname, port) = split_hostname_and_port(hostport);
        let (pathname, search, hash) = split_path_search_hash(tail);

        Ok(Self {
            scheme,
            hostname: hostname.to_ascii_lowercase(),
            port,
            pathname: normalize_pathname(&pathname),
            search,
            hash,
        })
    }

    pub(crate) fn hostname(&self) -> &str {
        &self.hostname
    }

    pub(crate) fn pathname(&self) -> &str {
        &self.pathname
    }

    fn host(&self) -> String {
        if self.port.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }

    pub(crate) fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host())
    }

    pub(crate) fn href(&self) -> String {
        format!(
            "{}{}{}{}",
            self.origin(),
            self.pathname,
            self.search,
            self.hash
        )
    }

    /// Resolves `reference` the way an anchor's `href` is resolved against the
    /// document URL.
    pub(crate) fn resolve(&self, reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.contains("://") {
            return Self::parse(reference);
        }
        if let Some(hash) = reference.strip_prefix('#') {
            let mut next = self.clone();
            next.hash = format!("#{hash}");
            return Ok(next);
        }

        let (path, search, hash) = split_path_search_hash(reference);
        let pathname = if path.starts_with('/') {
            path
        } else {
            let dir = self
                .pathname
                .rsplit_once('/')
                .map_or("", |(dir, _)| dir);
            format!("{dir}/{path}")
        };

        Ok(Self {
            scheme: self.scheme.clone(),
            hostname: self.hostname.clone(),
            port: self.port.clone(),
            pathname: normalize_pathname(&pathname),
            search,
            hash,
        })
    }
}

fn is_valid_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn split_hostname_and_port(authority: &str) -> (String, String) {
    if let Some(rest) = authority.strip_prefix('[') {
        if let Some(end_idx) = rest.find(']') {
            let hostname = authority[..end_idx + 2].to_string();
            let port = authority[end_idx + 2..]
                .strip_prefix(':')
                .unwrap_or_default();
            return (hostname, port.to_string());
        }
    }

    match authority.rsplit_once(':') {
        Some((hostname, port)) if !hostname.contains(':') => {
            (hostname.to_string(), port.to_string())
        }
        _ => (authority.to_string(), String::new()),
    }
}

fn split_path_search_hash(tail: &str) -> (String, String, String) {
    let (rest, hash) = match tail.find('#') {
        Some(pos) => (&tail[..pos], &tail[pos..]),
        None => (tail, ""),
    };
    let (pathname, search) = match rest.find('?') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };
    (pathname.to_string(), search.to_string(), hash.to_string())
}

fn normalize_pathname(pathname: &str) -> String {
    let ends_with_slash = pathname.ends_with('/') && pathname.len() > 1;
    let mut parts = Vec::new();
    for segment in pathname.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            parts.pop();
            continue;
        }
        parts.push(segment);
    }
    let mut out = format!("/{}", parts.join("/"));
    if ends_with_slash && !out.ends_with('/') {
        out.push('/');
    }
    out
}
