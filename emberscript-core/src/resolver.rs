//! Rewrites name-based chapter links into [`ChapterId`] links.
//!
//! Runs once, after every chapter has been parsed, so forward references
//! (a choice pointing at a chapter further down the file) resolve like
//! backward ones.

use rustc_hash::FxHashMap;

use crate::ast::{Chapter, ChapterId};
use crate::error::{ParseError, RefKind};

/// A chapter name that matched no chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub chapter: String,
    pub target: String,
    pub kind: RefKind,
}

impl From<UnresolvedRef> for ParseError {
    fn from(r: UnresolvedRef) -> Self {
        ParseError::UnresolvedReference {
            chapter: r.chapter,
            target: r.target,
            kind: r.kind,
        }
    }
}

/// Resolves every link in `chapters` and returns the names that matched
/// nothing; their `*_id` fields are left `None`.
///
/// Name lookups are first-match-wins in parse order.
pub fn resolve(chapters: &mut [Chapter]) -> Vec<UnresolvedRef> {
    let mut ids: FxHashMap<String, ChapterId> = FxHashMap::default();
    let mut choosers: FxHashMap<String, (String, ChapterId)> = FxHashMap::default();
    for chapter in chapters.iter() {
        ids.entry(chapter.name.clone()).or_insert(chapter.id);
        for choice in &chapter.choices {
            choosers
                .entry(choice.target_chapter.clone())
                .or_insert_with(|| (chapter.name.clone(), chapter.id));
        }
    }

    let mut dangling = Vec::new();

    // A choice pointing at a chapter is its authoritative predecessor.
    for chapter in chapters.iter_mut() {
        if let Some((name, id)) = choosers.get(&chapter.name) {
            chapter.previous_chapter = Some(name.clone());
            chapter.previous_chapter_id = Some(*id);
        }
        if let Some(next) = &chapter.next_chapter {
            chapter.next_chapter_id = ids.get(next).copied();
            if chapter.next_chapter_id.is_none() {
                dangling.push(UnresolvedRef {
                    chapter: chapter.name.clone(),
                    target: next.clone(),
                    kind: RefKind::NextChapter,
                });
            }
        }
    }

    for chapter in chapters.iter_mut() {
        for choice in &mut chapter.choices {
            choice.target_chapter_id = ids.get(&choice.target_chapter).copied();
            if choice.target_chapter_id.is_none() {
                dangling.push(UnresolvedRef {
                    chapter: chapter.name.clone(),
                    target: choice.target_chapter.clone(),
                    kind: RefKind::ChoiceTarget,
                });
            }
        }
    }

    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Choice;

    fn choice(parent: &Chapter, target: &str) -> Choice {
        Choice {
            target_chapter: target.into(),
            label: "go\"".into(),
            parent_chapter_id: parent.id,
            target_chapter_id: None,
        }
    }

    #[test]
    fn choice_parent_overrides_linear_predecessor() {
        let mut a = Chapter::new("a", None);
        let mut b = Chapter::new("b", Some("c".into()));
        let mut c = Chapter::new("c", None);
        let to_c = choice(&a, "c");
        a.choices.push(to_c);
        b.previous_chapter = Some("a".into());
        c.previous_chapter = Some("b".into());
        c.previous_chapter_id = Some(b.id);

        let mut chapters = vec![a, b, c];
        let dangling = resolve(&mut chapters);

        assert!(dangling.is_empty());
        assert_eq!(chapters[2].previous_chapter.as_deref(), Some("a"));
        assert_eq!(chapters[2].previous_chapter_id, Some(chapters[0].id));
        assert_eq!(chapters[1].next_chapter_id, Some(chapters[2].id));
        assert_eq!(chapters[0].choices[0].target_chapter_id, Some(chapters[2].id));
    }

    #[test]
    fn unknown_names_stay_unresolved() {
        let a = Chapter::new("a", Some("nowhere".into()));
        let mut b = Chapter::new("b", None);
        let to_missing = choice(&b, "missing");
        b.choices.push(to_missing);

        let mut chapters = vec![a, b];
        let dangling = resolve(&mut chapters);

        assert_eq!(chapters[0].next_chapter_id, None);
        assert_eq!(chapters[1].choices[0].target_chapter_id, None);
        assert_eq!(
            dangling,
            vec![
                UnresolvedRef { chapter: "a".into(), target: "nowhere".into(), kind: RefKind::NextChapter },
                UnresolvedRef { chapter: "b".into(), target: "missing".into(), kind: RefKind::ChoiceTarget },
            ]
        );
    }
}
