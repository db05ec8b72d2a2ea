//! Post ordering and prev/next resolution
//!
//! Posts are ordered newest first, with equal dates broken by slug so the
//! order never depends on directory listing order. "Previous" is the
//! neighbour before the current post in that order (the newer one) and
//! "next" the one after it (the older one).

use std::cmp::Ordering;

use crate::content::Post;

/// The neighbours of a post in navigation order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Navigation<'a> {
    pub previous: Option<&'a Post>,
    pub next: Option<&'a Post>,
}

impl Navigation<'_> {
    /// True when the post has no neighbour on either side
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}

/// Total order used for navigation: date descending, then slug ascending
pub fn compare(a: &Post, b: &Post) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

/// All posts in navigation order
pub fn order_posts(posts: &[Post]) -> Vec<&Post> {
    let mut ordered: Vec<&Post> = posts.iter().collect();
    ordered.sort_by(|a, b| compare(a, b));
    ordered
}

/// Neighbours of `current_slug`; an unknown slug has none
pub fn resolve_navigation<'a>(posts: &'a [Post], current_slug: &str) -> Navigation<'a> {
    let ordered = order_posts(posts);
    let Some(index) = ordered.iter().position(|p| p.slug == current_slug) else {
        return Navigation::default();
    };

    Navigation {
        previous: index.checked_sub(1).map(|i| ordered[i]),
        next: ordered.get(index + 1).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(slug: &str, date: &str) -> Post {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Post::new(slug, slug.to_uppercase(), date)
    }

    fn slugs(nav: &Navigation) -> (Option<String>, Option<String>) {
        (
            nav.previous.map(|p| p.slug.clone()),
            nav.next.map(|p| p.slug.clone()),
        )
    }

    #[test]
    fn test_interior_post() {
        let posts = vec![
            post("c", "2023-03-01"),
            post("b", "2023-02-01"),
            post("a", "2023-01-01"),
        ];
        let nav = resolve_navigation(&posts, "b");
        assert_eq!(slugs(&nav), (Some("c".into()), Some("a".into())));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let posts = vec![
            post("a", "2023-01-01"),
            post("c", "2023-03-01"),
            post("b", "2023-02-01"),
        ];
        let nav = resolve_navigation(&posts, "b");
        assert_eq!(slugs(&nav), (Some("c".into()), Some("a".into())));
    }

    #[test]
    fn test_boundaries() {
        let posts = vec![
            post("a", "2023-01-01"),
            post("b", "2023-02-01"),
            post("c", "2023-03-01"),
        ];
        let newest = resolve_navigation(&posts, "c");
        assert_eq!(slugs(&newest), (None, Some("b".into())));

        let oldest = resolve_navigation(&posts, "a");
        assert_eq!(slugs(&oldest), (Some("b".into()), None));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(resolve_navigation(&[], "anything").is_empty());

        let posts = vec![post("only", "2023-01-01")];
        assert!(resolve_navigation(&posts, "only").is_empty());
    }

    #[test]
    fn test_unknown_slug() {
        let posts = vec![post("a", "2023-01-01"), post("b", "2023-02-01")];
        assert_eq!(resolve_navigation(&posts, "zzz"), Navigation::default());
    }

    #[test]
    fn test_equal_dates_break_on_slug() {
        let posts = vec![
            post("zeta", "2023-05-05"),
            post("alpha", "2023-05-05"),
            post("mid", "2023-05-05"),
            post("newer", "2023-06-01"),
        ];
        let order: Vec<&str> = order_posts(&posts).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, ["newer", "alpha", "mid", "zeta"]);

        let nav = resolve_navigation(&posts, "mid");
        assert_eq!(slugs(&nav), (Some("alpha".into()), Some("zeta".into())));

        let mut reversed = posts.clone();
        reversed.reverse();
        for _ in 0..3 {
            assert_eq!(slugs(&resolve_navigation(&reversed, "mid")), slugs(&nav));
        }
    }

    #[test]
    fn test_every_post_links_to_adjacent_neighbours() {
        let posts = vec![
            post("p1", "2021-07-04"),
            post("p2", "2022-01-23"),
            post("p3", "2022-01-23"),
            post("p4", "2020-12-31"),
            post("p5", "2023-09-10"),
        ];
        let ordered = order_posts(&posts);
        for (i, current) in ordered.iter().enumerate() {
            let nav = resolve_navigation(&posts, &current.slug);
            match nav.previous {
                Some(prev) => {
                    assert_eq!(prev.slug, ordered[i - 1].slug);
                    assert!(prev.date >= current.date);
                }
                None => assert_eq!(i, 0),
            }
            match nav.next {
                Some(next) => {
                    assert_eq!(next.slug, ordered[i + 1].slug);
                    assert!(next.date <= current.date);
                }
                None => assert_eq!(i, ordered.len() - 1),
            }
        }
    }
}
