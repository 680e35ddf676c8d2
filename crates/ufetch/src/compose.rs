//! Target URL resolution and query composition

use url::Url;

use crate::body::RequestData;
use crate::error::{Error, Result};
use crate::method::Method;
use crate::state::EmptyQuery;

/// Origin used to parse relative targets when no absolute base URL exists
const PLACEHOLDER_ORIGIN: &str = "http://placeholder.invalid/";

/// Resolve the URL a request is sent to
///
/// The explicit URL wins over the base URL. For GET and HEAD, object data is
/// appended to the query string; pairs already present are kept.
///
/// A relative target is joined onto the base URL when that is absolute.
/// Without one, the target is only checked for syntax and kept as written,
/// so a browser transport resolves it against the current document.
pub fn compose(
    explicit_url: Option<&str>,
    base_url: Option<&str>,
    data: Option<&RequestData>,
    method: Method,
    empty_query: EmptyQuery,
) -> Result<String> {
    let base_url = base_url.filter(|url| !url.is_empty());
    let target = explicit_url
        .filter(|url| !url.is_empty())
        .or(base_url)
        .ok_or(Error::MissingUrl)?;

    let pairs = if method.is_read_style() {
        data.and_then(RequestData::query_pairs)
    } else {
        None
    };

    match resolve(target, base_url)? {
        Target::Absolute(mut url) => {
            if let Some(pairs) = pairs {
                if pairs.is_empty() {
                    if empty_query == EmptyQuery::TrailingMark && url.query().is_none() {
                        url.set_query(Some(""));
                    }
                } else {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            }
            Ok(url.to_string())
        }
        Target::Relative => Ok(append_relative_query(target, pairs, empty_query)),
    }
}

enum Target {
    Absolute(Url),
    /// Relative reference with no absolute base to resolve it against
    Relative,
}

fn resolve(target: &str, base_url: Option<&str>) -> Result<Target> {
    let invalid = |source: url::ParseError| Error::InvalidUrl {
        url: target.to_string(),
        source,
    };

    match Url::parse(target) {
        Ok(url) => Ok(Target::Absolute(url)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if let Some(base) = base_url.and_then(|base| Url::parse(base).ok()) {
                return base.join(target).map(Target::Absolute).map_err(invalid);
            }
            Url::parse(PLACEHOLDER_ORIGIN)
                .and_then(|placeholder| placeholder.join(target))
                .map(|_| Target::Relative)
                .map_err(invalid)
        }
        Err(err) => Err(invalid(err)),
    }
}

/// Append query pairs to a relative reference without resolving it
fn append_relative_query(
    target: &str,
    pairs: Option<Vec<(String, String)>>,
    empty_query: EmptyQuery,
) -> String {
    let (head, fragment) = match target.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (target, None),
    };

    let mut out = head.to_string();
    if let Some(pairs) = pairs {
        if pairs.is_empty() {
            if empty_query == EmptyQuery::TrailingMark && !head.contains('?') {
                out.push('?');
            }
        } else {
            match head.find('?') {
                None => out.push('?'),
                Some(pos) if pos + 1 < head.len() => out.push('&'),
                Some(_) => {}
            }
            out.push_str(
                &url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish(),
            );
        }
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
