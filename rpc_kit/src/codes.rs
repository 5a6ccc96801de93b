//! Outcome codes shared by the adapter and the services it exposes.
//!
//! Every [`Code`] is a standard HTTP status, so the adapter can use it
//! verbatim as the response status line.

use std::fmt;

use crate::error::Error;

macro_rules! codes {
    ($($(#[$doc:meta])* $name:ident = $num:literal, $reason:literal;)*) => {
        /// A closed set of outcome classes, numerically identical to HTTP
        /// status codes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Code {
            $($(#[$doc])* $name = $num,)*
        }

        impl Code {
            /// Every known code, in ascending order.
            pub const ALL: &'static [Code] = &[$(Code::$name,)*];

            /// Canonical reason phrase, e.g. `"Not Found"`.
            pub const fn reason(self) -> &'static str {
                match self {
                    $(Code::$name => $reason,)*
                }
            }
        }

        impl TryFrom<u16> for Code {
            type Error = Error;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $($num => Ok(Code::$name),)*
                    other => Err(Error::UnknownCode(other)),
                }
            }
        }
    };
}

codes! {
    Continue = 100, "Continue";
    SwitchingProtocols = 101, "Switching Protocols";
    Processing = 102, "Processing";
    EarlyHints = 103, "Early Hints";
    Ok = 200, "OK";
    Created = 201, "Created";
    Accepted = 202, "Accepted";
    NonAuthoritativeInfo = 203, "Non-Authoritative Information";
    NoContent = 204, "No Content";
    ResetContent = 205, "Reset Content";
    PartialContent = 206, "Partial Content";
    MultiStatus = 207, "Multi-Status";
    AlreadyReported = 208, "Already Reported";
    ImUsed = 226, "IM Used";
    MultipleChoices = 300, "Multiple Choices";
    MovedPermanently = 301, "Moved Permanently";
    Found = 302, "Found";
    SeeOther = 303, "See Other";
    NotModified = 304, "Not Modified";
    UseProxy = 305, "Use Proxy";
    TemporaryRedirect = 307, "Temporary Redirect";
    PermanentRedirect = 308, "Permanent Redirect";
    BadRequest = 400, "Bad Request";
    Unauthorized = 401, "Unauthorized";
    PaymentRequired = 402, "Payment Required";
    Forbidden = 403, "Forbidden";
    NotFound = 404, "Not Found";
    MethodNotAllowed = 405, "Method Not Allowed";
    NotAcceptable = 406, "Not Acceptable";
    ProxyAuthRequired = 407, "Proxy Authentication Required";
    RequestTimeout = 408, "Request Timeout";
    Conflict = 409, "Conflict";
    Gone = 410, "Gone";
    LengthRequired = 411, "Length Required";
    PreconditionFailed = 412, "Precondition Failed";
    RequestEntityTooLarge = 413, "Request Entity Too Large";
    RequestUriTooLong = 414, "Request URI Too Long";
    UnsupportedMediaType = 415, "Unsupported Media Type";
    RequestedRangeNotSatisfiable = 416, "Requested Range Not Satisfiable";
    ExpectationFailed = 417, "Expectation Failed";
    /// Unused.
    Teapot = 418, "I'm a teapot";
    MisdirectedRequest = 421, "Misdirected Request";
    UnprocessableEntity = 422, "Unprocessable Entity";
    Locked = 423, "Locked";
    FailedDependency = 424, "Failed Dependency";
    TooEarly = 425, "Too Early";
    UpgradeRequired = 426, "Upgrade Required";
    PreconditionRequired = 428, "Precondition Required";
    TooManyRequests = 429, "Too Many Requests";
    RequestHeaderFieldsTooLarge = 431, "Request Header Fields Too Large";
    UnavailableForLegalReasons = 451, "Unavailable For Legal Reasons";
    InternalServerError = 500, "Internal Server Error";
    NotImplemented = 501, "Not Implemented";
    BadGateway = 502, "Bad Gateway";
    ServiceUnavailable = 503, "Service Unavailable";
    GatewayTimeout = 504, "Gateway Timeout";
    HttpVersionNotSupported = 505, "HTTP Version Not Supported";
    VariantAlsoNegotiates = 506, "Variant Also Negotiates";
    InsufficientStorage = 507, "Insufficient Storage";
    LoopDetected = 508, "Loop Detected";
    NotExtended = 510, "Not Extended";
    NetworkAuthenticationRequired = 511, "Network Authentication Required";
}

impl Code {
    pub const INTERNAL: Code = Code::InternalServerError;
    pub const INVALID: Code = Code::BadRequest;
    pub const ALREADY_EXISTS: Code = Code::Conflict;

    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub const fn is_informational(self) -> bool {
        matches!(self.as_u16(), 100..=199)
    }

    /// 2xx codes carry the method's output as the response body.
    pub const fn is_success(self) -> bool {
        matches!(self.as_u16(), 200..=299)
    }

    pub const fn is_redirection(self) -> bool {
        matches!(self.as_u16(), 300..=399)
    }

    pub const fn is_client_error(self) -> bool {
        matches!(self.as_u16(), 400..=499)
    }

    pub const fn is_server_error(self) -> bool {
        matches!(self.as_u16(), 500..=599)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

impl From<Code> for u16 {
    fn from(code: Code) -> Self {
        code.as_u16()
    }
}

impl From<Code> for axum::http::StatusCode {
    fn from(code: Code) -> Self {
        axum::http::StatusCode::from_u16(code.as_u16())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Classification of a backing-store failure, independent of the driver
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    NotNullViolation,
    CheckViolation,
    NoRows,
    Other,
}

impl StoreErrorKind {
    /// Classifies a PostgreSQL SQLSTATE.
    ///
    /// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>.
    pub fn from_sqlstate(sqlstate: &str) -> Self {
        match sqlstate {
            "23505" => StoreErrorKind::UniqueViolation,
            "23503" => StoreErrorKind::ForeignKeyViolation,
            "23502" => StoreErrorKind::NotNullViolation,
            "23514" => StoreErrorKind::CheckViolation,
            _ => StoreErrorKind::Other,
        }
    }
}

impl From<StoreErrorKind> for Code {
    fn from(kind: StoreErrorKind) -> Self {
        match kind {
            StoreErrorKind::UniqueViolation => Code::ALREADY_EXISTS,
            StoreErrorKind::ForeignKeyViolation => Code::UnprocessableEntity,
            StoreErrorKind::NotNullViolation | StoreErrorKind::CheckViolation => Code::INVALID,
            StoreErrorKind::NoRows => Code::NotFound,
            StoreErrorKind::Other => Code::INTERNAL,
        }
    }
}
