use itertools::Itertools;
use pstree_common::{
    assert_tree_matches, build_process_tree, Field, FieldPattern, Pattern, ProcessRecord,
    ProcessTreeNode,
};
use rstest::*;

fn row(pid: &str, ppid: &str, ruser: &str, args: &str) -> ProcessRecord {
    ProcessRecord::new(pid, ppid, ruser, args)
}

fn only(field: Field, value: &str) -> Pattern {
    Pattern::from_fields(FieldPattern::new().with(field, value))
}

const TINI_ARGS: &str = "tini -- django-entrypoint.sh mysite.wsgi:application";
const GUNICORN_ARGS: &str = "/usr/local/bin/python /usr/local/bin/gunicorn mysite.wsgi:application --pid /var/run/gunicorn/gunicorn.pid --bind unix:/var/run/gunicorn/gunicorn.sock --umask 0117";
const NGINX_MASTER_ARGS: &str = "nginx: master process nginx -g daemon off;";
const NGINX_WORKER_ARGS: &str = "nginx: worker process";

#[fixture]
fn web_tree() -> ProcessTreeNode {
    build_process_tree(vec![
        row("1", "0", "root", TINI_ARGS),
        row("6", "1", "django", GUNICORN_ARGS),
        row("17", "6", "django", GUNICORN_ARGS),
        row("18", "6", "root", NGINX_MASTER_ARGS),
        row("21", "18", "nginx", NGINX_WORKER_ARGS),
    ])
    .unwrap()
}

fn web_pattern() -> Pattern {
    Pattern::new("root", TINI_ARGS).pid("1").with_child(
        Pattern::new("django", GUNICORN_ARGS).with_children([
            Pattern::new("django", GUNICORN_ARGS),
            Pattern::new("root", NGINX_MASTER_ARGS)
                .with_child(Pattern::new("nginx", NGINX_WORKER_ARGS)),
        ]),
    )
}

#[rstest]
fn test_web_container_shape(web_tree: ProcessTreeNode) {
    assert_tree_matches(&web_tree, &web_pattern());
}

#[rstest]
fn test_tree_matches_pattern_built_from_itself(web_tree: ProcessTreeNode) {
    assert_tree_matches(&web_tree, &Pattern::from_tree(&web_tree, &Field::ALL));
    assert_tree_matches(
        &web_tree,
        &Pattern::from_tree(&web_tree, &[Field::Ruser, Field::Args]),
    );
}

#[rstest]
fn test_child_order_does_not_change_outcome(web_tree: ProcessTreeNode) {
    let gunicorn = &web_tree.children[0];
    let good = web_pattern().child_patterns()[0].clone();
    let bad = Pattern::new("django", GUNICORN_ARGS).with_children([
        Pattern::new("django", GUNICORN_ARGS),
        Pattern::new("root", NGINX_MASTER_ARGS),
    ]);

    for children in gunicorn.children.iter().cloned().permutations(2) {
        let shuffled = ProcessTreeNode::with_children(gunicorn.row.clone(), children);
        assert!(good.match_tree(&shuffled).is_none());

        let mismatch = bad.match_tree(&shuffled).unwrap();
        let children_mismatch = mismatch.children_mismatch.unwrap();
        assert_eq!(children_mismatch.pair_mismatches.len(), 1);
        assert_eq!(children_mismatch.pair_mismatches[0].subject.pid, "18");
    }

    for patterns in good.child_patterns().iter().cloned().permutations(2) {
        let reordered = Pattern::new("django", GUNICORN_ARGS).with_children(patterns);
        assert!(reordered.match_tree(gunicorn).is_none());
    }
}

#[test]
fn test_unconstrained_pid_is_ignored_until_named() {
    let first = ProcessTreeNode::leaf(row("10", "1", "django", "worker"));
    let second = ProcessTreeNode::leaf(row("11", "2", "django", "worker"));
    let pattern = Pattern::new("django", "worker");

    assert!(pattern.match_tree(&first).is_none());
    assert!(pattern.match_tree(&second).is_none());

    let pinned = pattern.pid("10");
    assert!(pinned.match_tree(&first).is_none());
    assert!(pinned.match_tree(&second).is_some());
}

#[test]
fn test_missing_child_is_a_count_mismatch() {
    let tree = ProcessTreeNode::with_children(
        row("1", "0", "root", "init"),
        vec![
            ProcessTreeNode::leaf(row("2", "1", "app", "a")),
            ProcessTreeNode::leaf(row("3", "1", "app", "b")),
        ],
    );
    let pattern = Pattern::new("root", "init").with_children([
        Pattern::new("app", "a"),
        Pattern::new("app", "b"),
        Pattern::new("app", "c"),
    ]);

    let mismatch = pattern.match_tree(&tree).unwrap();

    assert!(mismatch.fields_mismatch.is_none());
    let children = mismatch.children_mismatch.clone().unwrap();
    assert_eq!((children.expected, children.actual), (3, 2));
    assert_eq!(
        mismatch.describe(),
        [
            r#"PsTree(args="init", ruser="root" with 3 children) mismatch at pid 1: ["#,
            "  mismatches in children:",
            "    expected 3 children, found 2",
            r#"    missing child: PsTree(args="c", ruser="app" with 0 children)"#,
            "]",
        ]
        .join("\n")
    );
}

#[rstest]
#[case::catch_all_first(vec![only(Field::Ruser, "app"), only(Field::Args, "y")])]
#[case::catch_all_last(vec![only(Field::Args, "y"), only(Field::Ruser, "app")])]
fn test_assignment_is_not_first_fit(
    #[case] patterns: Vec<Pattern>,
    #[values(false, true)] reverse_children: bool,
) {
    let mut children = vec![
        ProcessTreeNode::leaf(row("2", "1", "app", "x")),
        ProcessTreeNode::leaf(row("3", "1", "app", "y")),
    ];
    if reverse_children {
        children.reverse();
    }
    let tree = ProcessTreeNode::with_children(row("1", "0", "root", "init"), children);

    assert_tree_matches(&tree, &Pattern::new("root", "init").with_children(patterns));
}

#[rstest]
#[case::in_order(vec!["worker-1", "worker-2"])]
#[case::reversed(vec!["worker-2", "worker-1"])]
fn test_identical_child_patterns(#[case] worker_args: Vec<&str>) {
    let workers = worker_args
        .iter()
        .enumerate()
        .map(|(idx, args)| ProcessTreeNode::leaf(row(&(idx + 2).to_string(), "1", "django", args)))
        .collect();
    let tree = ProcessTreeNode::with_children(row("1", "0", "root", "init"), workers);

    let pattern = Pattern::new("root", "init").with_children([
        only(Field::Ruser, "django"),
        only(Field::Ruser, "django"),
    ]);
    assert_tree_matches(&tree, &pattern);

    let three = pattern.with_child(only(Field::Ruser, "django"));
    assert!(three.match_tree(&tree).is_some());
}

#[test]
fn test_deep_field_mismatch_is_reported_at_its_depth() {
    let tree = build_process_tree(vec![
        row("1", "0", "root", "init"),
        row("2", "1", "app", "a"),
        row("3", "2", "app", "b"),
        row("4", "3", "app", "c-broken"),
        row("5", "1", "app", "sidecar"),
    ])
    .unwrap();
    let pattern = Pattern::new("root", "init").with_children([
        Pattern::new("app", "a").with_child(
            Pattern::new("app", "b").with_child(Pattern::new("app", "c")),
        ),
        Pattern::new("app", "sidecar"),
    ]);

    let description = pattern.match_tree(&tree).unwrap().describe();

    assert_eq!(
        description,
        [
            r#"PsTree(args="init", ruser="root" with 2 children) mismatch at pid 1: ["#,
            "  mismatches in children:",
            r#"    PsTree(args="a", ruser="app" with 1 child) mismatch at pid 2: ["#,
            "      mismatches in children:",
            r#"        PsTree(args="b", ruser="app" with 1 child) mismatch at pid 3: ["#,
            "          mismatches in children:",
            r#"            PsTree(args="c", ruser="app" with 0 children) mismatch at pid 4: ["#,
            r#"              args: expected "c", actual "c-broken""#,
            "            ]",
            "        ]",
            "    ]",
            "]",
        ]
        .join("\n")
    );
    assert!(!description.contains("sidecar"));
    assert_eq!(description, pattern.match_tree(&tree).unwrap().describe());
}
