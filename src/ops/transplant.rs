use crate::modfile::{Manifest, Replace};

/// Replace directives removed from and added to the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransplantReport {
    pub dropped: Vec<Replace>,
    pub added: Vec<Replace>,
}

impl TransplantReport {
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty() && self.added.is_empty()
    }
}

/// Makes the target's replace directives exactly the source's.
///
/// Every existing target replace is dropped by its old reference, the tree
/// is cleaned up, each source replace is added in source order, and the
/// target's blocks are sorted. Everything else in the target is left alone.
pub fn transplant_replaces(source: &Manifest, target: &mut Manifest) -> TransplantReport {
    let dropped = target.replaces().to_vec();
    for r in &dropped {
        log::debug!("Dropping replace: {}", r);
        target.drop_replace(&r.old.path, &r.old.version);
    }
    target.cleanup();

    let added = source.replaces().to_vec();
    for r in &added {
        log::debug!("Adding replace: {}", r);
        target.add_replace(&r.old, &r.new);
    }
    target.sort_blocks();

    TransplantReport { dropped, added }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modfile::{ModuleVersion, parse};

    fn manifest(src: &str) -> Manifest {
        parse(src.as_bytes()).unwrap()
    }

    fn text(m: &Manifest) -> String {
        String::from_utf8(m.format().unwrap()).unwrap()
    }

    fn keys(m: &Manifest) -> Vec<(ModuleVersion, ModuleVersion)> {
        let mut keys: Vec<_> = m
            .replaces()
            .iter()
            .map(|r| (r.old.clone(), r.new.clone()))
            .collect();
        keys.sort();
        keys
    }

    const SOURCE: &str = "module example.com/dep\n\ngo 1.21\n\n\
        replace (\n\tA v1 => /local/A\n\tB => B v2\n)\n";

    const TARGET: &str = "module example.com/app\n\ngo 1.21\n\n\
        require (\n\tA v1\n\tB v2\n)\n\nreplace C => /local/C\n";

    #[test]
    fn test_example_scenario() {
        let source = manifest(SOURCE);
        let mut target = manifest(TARGET);

        let report = transplant_replaces(&source, &mut target);

        let dropped: Vec<_> = report.dropped.iter().map(ToString::to_string).collect();
        let added: Vec<_> = report.added.iter().map(ToString::to_string).collect();
        assert_eq!(dropped, vec!["C => /local/C"]);
        assert_eq!(added, vec!["A v1 => /local/A", "B => B v2"]);
        assert_eq!(keys(&target), keys(&source));
        assert_eq!(
            text(&target),
            "module example.com/app\n\ngo 1.21\n\nrequire (\n\tA v1\n\tB v2\n)\n\n\
             replace (\n\tA v1 => /local/A\n\tB => B v2\n)\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let source = manifest(SOURCE);
        let mut target = manifest(TARGET);
        transplant_replaces(&source, &mut target);
        let first = text(&target);

        let mut again = manifest(&first);
        let report = transplant_replaces(&source, &mut again);

        assert_eq!(text(&again), first);
        assert_eq!(report.dropped.len(), 2);
        assert_eq!(report.added.len(), 2);
    }

    #[test]
    fn test_source_without_replaces_clears_target() {
        let source = manifest("module example.com/dep\n");
        let mut target = manifest(TARGET);

        let report = transplant_replaces(&source, &mut target);

        assert!(report.added.is_empty());
        assert!(target.replaces().is_empty());
        assert!(!text(&target).contains("replace"));
    }

    #[test]
    fn test_empty_report() {
        let source = manifest("module a\n");
        let mut target = manifest("module b\n");
        assert!(transplant_replaces(&source, &mut target).is_empty());
        assert_eq!(text(&target), "module b\n");
    }

    #[test]
    fn test_preserves_other_directives() {
        let target_src = "// app manifest\n\nmodule example.com/app\n\ngo 1.22\n\n\
            require (\n\tA v1\n\tz v3 // indirect\n)\n\nexclude A v0.1.0\n\n\
            replace (\n\tC => /local/C\n\t// trailing note\n)\n\nretract v0.0.1\n";
        let source = manifest(SOURCE);
        let mut target = manifest(target_src);
        let before = manifest(target_src);

        transplant_replaces(&source, &mut target);

        assert_eq!(target.module(), before.module());
        assert_eq!(target.go_version(), before.go_version());
        let reqs = |m: &Manifest| -> Vec<_> {
            m.requires()
                .iter()
                .map(|r| (r.module.clone(), r.indirect))
                .collect()
        };
        assert_eq!(reqs(&target), reqs(&before));
        assert_eq!(target.excludes()[0].module, before.excludes()[0].module);

        let out = text(&target);
        assert!(out.starts_with("// app manifest\n\nmodule example.com/app\n"));
        assert!(out.contains("retract v0.0.1\n"));
        assert!(!out.contains("/local/C"));
    }

    #[test]
    fn test_output_is_sorted_regardless_of_source_order() {
        let source = manifest("module d\n\nreplace (\n\tz => ../z\n\tm => ../m\n\ta => ../a\n)\n");
        let mut target = manifest("module t\n");

        transplant_replaces(&source, &mut target);

        assert_eq!(
            text(&target),
            "module t\n\nreplace (\n\ta => ../a\n\tm => ../m\n\tz => ../z\n)\n"
        );
    }

    #[test]
    fn test_duplicate_source_keys_last_wins() {
        let source = manifest("module d\n\nreplace (\n\tA => ../first\n\tA => ../second\n)\n");
        let mut target = manifest("module t\n");

        let report = transplant_replaces(&source, &mut target);

        assert_eq!(report.added.len(), 2);
        assert_eq!(target.replaces().len(), 1);
        assert_eq!(target.replaces()[0].new.path, "../second");
    }
}
