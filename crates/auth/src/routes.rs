//! Route paths known to the gate and the fixed public allow-list.

pub const ROOT: &str = "/";
pub const HOME: &str = "/home";
pub const LOGIN: &str = "/login";
pub const BANNED: &str = "/banned";
pub const ADMIN_PREFIX: &str = "/admin";
pub const ADMIN_LOGIN: &str = "/admin/login";

/// Paths reachable without authentication. Membership is exact-match.
pub const PUBLIC_PATHS: [&str; 10] = [
    ROOT,
    HOME,
    LOGIN,
    "/signup",
    "/signup/verify",
    ADMIN_LOGIN,
    "/forgot-password",
    "/reset-password",
    "/about",
    "/contact",
];

/// Current navigable location as supplied by the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: String,
    query: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
        }
    }

    /// Attach a query string. A leading `?` is accepted and dropped; an empty
    /// query is the same as none.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        let query = query.strip_prefix('?').unwrap_or(&query);
        self.query = (!query.is_empty()).then(|| query.to_string());
        self
    }

    /// Split a request target such as `/seekers/opportunities?page=2`.
    pub fn parse(target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(path).with_query(query),
            None => Self::new(target),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    pub fn family(&self) -> RouteFamily {
        RouteFamily::of(&self.path)
    }

    pub fn is_public(&self) -> bool {
        is_public_path(&self.path)
    }

    /// `/login?next=<urlencoded path+query>`.
    pub fn login_redirect(&self) -> String {
        with_next(LOGIN, self)
    }

    /// `/admin/login?next=<urlencoded path+query>`.
    pub fn admin_login_redirect(&self) -> String {
        with_next(ADMIN_LOGIN, self)
    }
}

impl From<&str> for Location {
    fn from(target: &str) -> Self {
        Self::parse(target)
    }
}

/// Coarse grouping of paths that decides which gate rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteFamily {
    /// Exactly `/banned`.
    BannedPage,
    /// Anything starting with `/admin`, `/admin/login` included.
    Admin,
    /// Everything else, known or not.
    General,
}

impl RouteFamily {
    pub fn of(path: &str) -> Self {
        if path == BANNED {
            RouteFamily::BannedPage
        } else if path.starts_with(ADMIN_PREFIX) {
            RouteFamily::Admin
        } else {
            RouteFamily::General
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn with_next(base: &str, location: &Location) -> String {
    format!(
        "{}?next={}",
        base,
        encode_uri_component(&location.path_and_query())
    )
}

/// Percent-encode with the `encodeURIComponent` unreserved set: on top of
/// `urlencoding`'s `A-Z a-z 0-9 - _ . ~`, the marks `! ' ( ) *` stay literal.
pub fn encode_uri_component(value: &str) -> String {
    const MARKS: [(&str, char); 5] = [
        ("%21", '!'),
        ("%27", '\''),
        ("%28", '('),
        ("%29", ')'),
        ("%2A", '*'),
    ];

    let encoded = urlencoding::encode(value);
    let mut out = String::with_capacity(encoded.len());
    let mut rest: &str = &encoded;
    // Every `%` in `encoded` opens a three-byte escape.
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let escape = &rest[idx..idx + 3];
        match MARKS.iter().find(|(code, _)| *code == escape) {
            Some((_, mark)) => out.push(*mark),
            None => out.push_str(escape),
        }
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    out
}
