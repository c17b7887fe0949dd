use super::{match_path, normalize_path, param, PathPattern, Segment};

#[test]
fn test_normalize_collapses_and_strips() {
    assert_eq!(normalize_path("/a//b/"), "/a/b");
    assert_eq!(normalize_path("/a/b"), "/a/b");
    assert_eq!(normalize_path("///orders///42//"), "/orders/42");
}

#[test]
fn test_normalize_keeps_root() {
    assert_eq!(normalize_path("/"), "/");
    assert_eq!(normalize_path("//"), "/");
    assert_eq!(normalize_path(""), "");
}

#[test]
fn test_normalize_strips_only_one_trailing_separator() {
    // Runs are collapsed first, so a single strip is enough.
    assert_eq!(normalize_path("/users///"), "/users");
}

#[test]
fn test_parse_segments() {
    let pattern = PathPattern::parse("/orders/:id/status");
    assert_eq!(pattern.as_str(), "/orders/:id/status");
    assert_eq!(
        pattern.segments(),
        &[
            Segment::Literal("orders".into()),
            Segment::Param("id".into()),
            Segment::Literal("status".into()),
        ]
    );
    assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id"]);
}

#[test]
fn test_bare_marker_is_literal() {
    let pattern = PathPattern::parse("/odd/:");
    assert_eq!(pattern.param_names().count(), 0);
    assert!(pattern.match_path("/odd/:").is_some());
    assert!(pattern.match_path("/odd/x").is_none());
}

#[test]
fn test_root_path() {
    let params = match_path("/", "/").unwrap();
    assert!(params.is_empty());
    assert!(match_path("/", "/anything").is_none());
}

#[test]
fn test_parameterized_path() {
    let params = match_path("/orders/:id", "/orders/ORDER123").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(param(&params, "id"), Some("ORDER123"));
}

#[test]
fn test_nested_path() {
    let params = match_path("/users/:user_id/orders/:order_id", "/users/7/orders/99").unwrap();
    assert_eq!(param(&params, "user_id"), Some("7"));
    assert_eq!(param(&params, "order_id"), Some("99"));
}

#[test]
fn test_literal_mismatch_fails_whole_match() {
    assert!(match_path("/orders/:id/status", "/orders/1/items").is_none());
    assert!(match_path("/orders", "/Orders").is_none());
}

#[test]
fn test_segment_count_must_agree() {
    assert!(match_path("/orders/:id", "/orders").is_none());
    assert!(match_path("/orders/:id", "/orders/1/extra").is_none());
    assert!(match_path("/orders", "/orders/1").is_none());
}

#[test]
fn test_leading_and_trailing_separators_ignored() {
    assert!(match_path("/orders/:id", "orders/1/").is_some());
    assert!(match_path("orders/:id/", "//orders//1").is_some());
}

#[test]
fn test_empty_mapping_for_static_pattern() {
    let params = match_path("/products", "/products").unwrap();
    assert!(params.is_empty());
}

#[test]
fn test_param_value_shape_not_validated() {
    let params = match_path("/items/:id", "/items/%20weird.value-!").unwrap();
    assert_eq!(param(&params, "id"), Some("%20weird.value-!"));
}

#[test]
fn test_duplicate_param_name_last_wins() {
    let params = match_path("/a/:id/b/:id", "/a/1/b/2").unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(param(&params, "id"), Some("2"));
}

#[test]
fn test_prefixed_pattern() {
    let base = PathPattern::parse("/");
    assert_eq!(base.prefixed("/users").as_str(), "/users");

    let nested = PathPattern::parse("/orders/:id");
    assert_eq!(nested.prefixed("/api/v1/").as_str(), "/api/v1/orders/:id");
    assert_eq!(nested.prefixed("").as_str(), "/orders/:id");
}
