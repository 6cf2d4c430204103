// classification of distribution entry points: target reference vs. literal module
use crate::core::target::EntryPointsValue;

/// One `category -> name -> spec` triple from an `entry_points` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntryPoint {
    pub is_target: bool,
    pub category: String,
    pub name: String,
    pub spec: String,
}

//`:bin` and `path/to:bin` point at targets, `pkg.mod:func` is a module
pub fn is_target_reference(spec: &str) -> bool {
    spec.starts_with(':') || spec.contains('/')
}

/// Flatten the field value in declaration order: categories first, then names.
pub fn classify_entry_points(all_entry_points: &EntryPointsValue) -> Vec<ClassifiedEntryPoint> {
    all_entry_points
        .iter()
        .flat_map(|(category, entry_points)| {
            entry_points.iter().map(move |(name, spec)| ClassifiedEntryPoint {
                is_target: is_target_reference(spec),
                category: category.clone(),
                name: name.clone(),
                spec: spec.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn entry_points(raw: &[(&str, &[(&str, &str)])]) -> EntryPointsValue {
        raw.iter()
            .map(|(category, entries)| {
                let inner: IndexMap<String, String> = entries
                    .iter()
                    .map(|(name, spec)| (name.to_string(), spec.to_string()))
                    .collect();
                (category.to_string(), inner)
            })
            .collect()
    }

    #[test]
    fn target_refs_are_recognized_by_sigil_or_separator() {
        assert!(is_target_reference(":foo"));
        assert!(is_target_reference("sub/mod.py"));
        assert!(is_target_reference("//src/app:bin"));
        assert!(!is_target_reference("pkg.mod:func"));
        assert!(!is_target_reference("pkg.mod"));
    }

    #[test]
    fn classification_preserves_declaration_order() {
        let all = entry_points(&[
            ("gui_scripts", &[("zeta", ":gui"), ("alpha", "pkg.gui:main")]),
            ("console_scripts", &[("run", "pkg.cli:run")]),
        ]);

        let classified = classify_entry_points(&all);
        let order: Vec<(&str, &str, bool)> = classified
            .iter()
            .map(|c| (c.category.as_str(), c.name.as_str(), c.is_target))
            .collect();

        assert_eq!(
            order,
            vec![
                ("gui_scripts", "zeta", true),
                ("gui_scripts", "alpha", false),
                ("console_scripts", "run", false),
            ]
        );
        assert_eq!(classified[0].spec, ":gui");
    }

    #[test]
    fn empty_field_classifies_to_nothing() {
        assert!(classify_entry_points(&EntryPointsValue::new()).is_empty());
    }
}
