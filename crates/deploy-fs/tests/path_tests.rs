use deploy_fs::NormalizedPath;
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("C:\\src\\checkout");
    assert_eq!(path.as_str(), "C:/src/checkout");
}

#[test]
fn test_file_name_and_extension() {
    let path = NormalizedPath::new("/etc/svn-deploy/config.toml");
    assert_eq!(path.file_name(), Some("config.toml"));
    assert_eq!(path.extension(), Some("toml"));
    assert_eq!(NormalizedPath::new("/srv/.svn").extension(), None);
}

#[rstest]
#[case("a/../b", "b")]
#[case("../a", "a")]
#[case("/a/b/../../c", "/c")]
#[case("a\\..\\b", "b")]
#[case("a/./b//c", "a/b/c")]
#[case("/srv/app/", "/srv/app")]
#[case(".", ".")]
fn test_lexical_cleaning(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[cfg(unix)]
#[rstest]
#[case("/tmp/work", true)]
#[case("//host/share", true)]
#[case("D:/deploy", false)]
#[case("C:\\src\\checkout", false)]
#[case("work", false)]
#[case("./work", false)]
#[case("", false)]
fn test_is_absolute_on_unix(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(NormalizedPath::new(input).is_absolute(), expected);
}

#[cfg(windows)]
#[rstest]
#[case("D:/deploy", true)]
#[case("C:\\src\\checkout", true)]
#[case("\\\\server\\share\\wc", true)]
#[case("/tmp/work", false)]
#[case("work", false)]
fn test_is_absolute_on_windows(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(NormalizedPath::new(input).is_absolute(), expected);
}

proptest! {
    #[test]
    fn normalization_is_idempotent(s in "\\PC*") {
        let once = NormalizedPath::new(&s);
        let twice = NormalizedPath::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_paths_have_no_backslashes_or_inner_double_slashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();
        prop_assert!(!as_str.contains('\\'));
        let body = as_str.strip_prefix("//").unwrap_or(as_str);
        prop_assert!(!body.contains("//"));
    }
}
