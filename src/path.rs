/// Returns the canonical form of a URL path.
///
/// The following rules are applied:
///  1. Multiple slashes are replaced by a single slash.
///  2. Each `.` element (the current directory) is removed.
///  3. Each `..` element (the parent directory) is removed along with the
///     element that precedes it. At the root, `..` is simply dropped.
///  4. A trailing slash is kept, and a trailing `.` element becomes one.
///
/// The result always starts with `/`; an empty result is `/`.
pub fn clean_path(p: &str) -> String {
    let mut elements: Vec<&str> = Vec::new();
    let mut trailing = false;

    for element in p.split('/') {
        trailing = false;
        match element {
            "" | "." => trailing = true,
            ".." => {
                elements.pop();
            }
            element => elements.push(element),
        }
    }

    let mut cleaned = String::with_capacity(p.len() + 1);
    for element in &elements {
        cleaned.push('/');
        cleaned.push_str(element);
    }

    if trailing || elements.is_empty() {
        cleaned.push('/');
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    // path, result
    fn clean_tests() -> Vec<(&'static str, &'static str)> {
        vec![
            // Already clean
            ("/", "/"),
            ("/abc", "/abc"),
            ("/a/b/c", "/a/b/c"),
            ("/abc/", "/abc/"),
            ("/a/b/c/", "/a/b/c/"),
            // missing root
            ("", "/"),
            ("a/", "/a/"),
            ("abc", "/abc"),
            ("abc/def", "/abc/def"),
            ("a/b/c", "/a/b/c"),
            // Remove doubled slash
            ("//", "/"),
            ("/abc//", "/abc/"),
            ("/abc/def//", "/abc/def/"),
            ("/a/b/c//", "/a/b/c/"),
            ("/abc//def//ghi", "/abc/def/ghi"),
            ("//abc", "/abc"),
            ("///abc", "/abc"),
            ("//abc//", "/abc/"),
            // Remove . elements
            (".", "/"),
            ("./", "/"),
            ("/abc/./def", "/abc/def"),
            ("/./abc/def", "/abc/def"),
            ("/abc/.", "/abc/"),
            // Remove .. elements
            ("..", "/"),
            ("../", "/"),
            ("../../", "/"),
            ("../..", "/"),
            ("../../abc", "/abc"),
            ("/abc/def/ghi/../jkl", "/abc/def/jkl"),
            ("/abc/def/../ghi/../jkl", "/abc/jkl"),
            ("/abc/def/..", "/abc"),
            ("/abc/def/../..", "/"),
            ("/abc/def/../../..", "/"),
            ("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
            // Dotted names are ordinary elements
            ("/.well-known/x", "/.well-known/x"),
            ("/a/..b/c", "/a/..b/c"),
            // Combinations
            ("abc/./../def", "/def"),
            ("abc//./../def", "/def"),
            ("abc/../../././../def", "/def"),
        ]
    }

    #[test]
    fn path_clean() {
        for (path, expected) in clean_tests() {
            assert_eq!(clean_path(path), expected, "clean_path({:?})", path);
            assert_eq!(clean_path(expected), expected, "clean_path({:?})", expected);
        }
    }

    #[test]
    fn path_clean_long() {
        for i in 1..1234 {
            let ss = "a".repeat(i);
            let correct = format!("/{}", ss);

            for path in [
                correct.clone(),
                ss.clone(),
                format!("//{}", ss),
                format!("//{}/b/..", ss),
            ] {
                assert_eq!(clean_path(&path), correct);
            }
        }
    }
}
