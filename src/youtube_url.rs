use url::Url;

const SHORT_LINK_HOST: &str = "youtu.be";
const CANONICAL_HOSTS: &[&str] = &["www.youtube.com", "youtube.com"];
const WATCH_PATH: &str = "/watch";

/// Path prefixes followed directly by the video ID.
const ID_PATH_PREFIXES: &[&str] = &["/embed/", "/v/"];

/// Extract the YouTube video ID from a URL.
///
/// Recognized shapes:
/// - `youtu.be/ID`
/// - `youtube.com/watch?v=ID`
/// - `youtube.com/embed/ID`
/// - `youtube.com/v/ID`
///
/// Anything else, including strings that are not URLs at all, yields `None`.
pub fn resolve(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    if host == SHORT_LINK_HOST {
        return first_segment(url.path().strip_prefix('/').unwrap_or(url.path()));
    }

    if !CANONICAL_HOSTS.contains(&host) {
        return None;
    }

    let path = url.path();
    if path == WATCH_PATH {
        return url
            .query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
    }

    ID_PATH_PREFIXES
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix))
        .and_then(first_segment)
}

fn first_segment(rest: &str) -> Option<String> {
    rest.split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn resolves_short_link() {
        assert_eq!(resolve("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some(ID));
        assert_eq!(resolve("https://youtu.be/dQw4w9WgXcQ?t=30").as_deref(), Some(ID));
    }

    #[test]
    fn resolves_watch_query() {
        assert_eq!(
            resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            resolve("https://youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=4").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn blank_v_values_are_skipped() {
        assert_eq!(
            resolve("https://www.youtube.com/watch?v=&v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn resolves_embed_and_v_paths() {
        assert_eq!(
            resolve("https://www.youtube.com/embed/dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
        assert_eq!(
            resolve("https://youtube.com/embed/dQw4w9WgXcQ/extra").as_deref(),
            Some(ID)
        );
        assert_eq!(
            resolve("https://www.youtube.com/v/dQw4w9WgXcQ?version=3").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn host_match_is_case_insensitive() {
        assert_eq!(resolve("HTTPS://YouTu.Be/dQw4w9WgXcQ").as_deref(), Some(ID));
    }

    #[test]
    fn unrecognized_shapes_are_absent() {
        for input in [
            "",
            "not a url",
            "youtu.be/dQw4w9WgXcQ",
            "https://vimeo.com/123456",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/watch/?v=dQw4w9WgXcQ",
            "https://www.youtube.com/@channel",
        ] {
            assert_eq!(resolve(input), None, "expected no id for {input:?}");
        }
    }

    #[test]
    fn missing_identifier_is_absent() {
        assert_eq!(resolve("https://youtu.be/"), None);
        assert_eq!(resolve("https://www.youtube.com/watch"), None);
        assert_eq!(resolve("https://www.youtube.com/watch?v="), None);
        assert_eq!(resolve("https://www.youtube.com/watch?list=PL123"), None);
        assert_eq!(resolve("https://www.youtube.com/embed/"), None);
        assert_eq!(resolve("https://www.youtube.com/v/"), None);
    }
}
