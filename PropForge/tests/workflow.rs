mod common;

use common::PropBuilder;
use pretty_assertions::assert_eq;
use propforge::prelude::*;

#[test]
fn test_translate_through_txt_file() {
    let dir = tempfile::tempdir().unwrap();
    let prop_path = dir.path().join("ui.prop");
    let txt_path = dir.path().join("ui.txt");
    std::fs::write(
        &prop_path,
        PropBuilder::flat(b"6VSM").strings(&["Yes", "No"]).build(),
    )
    .unwrap();

    let config = CodecConfig::default();
    let doc = read_prop(&prop_path, &config).unwrap();
    assert_eq!(export_for_translation(&doc, &txt_path, ExportFormat::Txt).unwrap(), 2);
    assert_eq!(std::fs::read_to_string(&txt_path).unwrap(), "1)\nYes\n2)\nNo\n");

    std::fs::write(&txt_path, "1)\nOui\n2)\nNon\n").unwrap();
    let mut doc = read_prop(&prop_path, &config).unwrap();
    let result = import_translations(&mut doc, &txt_path, ExportFormat::Txt).unwrap();
    assert_eq!(result.translated, 2);
    doc.save(&prop_path).unwrap();

    assert_eq!(read_prop(&prop_path, &config).unwrap().values(), ["Oui", "Non"]);
}

#[test]
fn test_properties_view_groups_languages() {
    let data = PropBuilder::nested(b"6VSM")
        .pairs(&[("Chapter", "Episode 1"), ("English", "Hello"), ("German", "Hallo")])
        .build();
    let doc = parse_prop_bytes(&data, &CodecConfig::default()).unwrap();

    let tree = properties_tree(&doc);
    let block = tree.find("Chapter").unwrap();
    assert_eq!(block.children[0].value, "Episode 1");
    let localized = block.find("Localized Text").unwrap();
    assert_eq!(localized.children.len(), 2);
    assert_eq!(localized.find("German").unwrap().value, "Hallo");
}

#[test]
fn test_batch_export_mirrors_tree() {
    let src = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(src.path().join("menus")).unwrap();
    std::fs::write(
        src.path().join("menus/main.prop"),
        PropBuilder::flat(b"5VSM").strings(&["Play"]).build(),
    )
    .unwrap();
    std::fs::write(
        src.path().join("credits.prop"),
        PropBuilder::nested(b"ERTM").pairs(&[("English", "Thanks")]).build(),
    )
    .unwrap();
    std::fs::write(src.path().join("broken.prop"), b"NIBM").unwrap();

    let files = find_prop_files(src.path());
    assert_eq!(files.len(), 3);

    let seen = std::sync::atomic::AtomicUsize::new(0);
    let result = batch_export(
        &files,
        src.path(),
        dest.path(),
        ExportFormat::Tsv,
        &CodecConfig::default(),
        |_| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        },
    );

    assert_eq!(seen.into_inner(), 3);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.fail_count, 1);
    assert_eq!(
        std::fs::read_to_string(dest.path().join("menus/main.tsv")).unwrap(),
        "Index\tOriginal\tTranslation\n1\tPlay\t\n"
    );
    assert!(dest.path().join("credits.tsv").is_file());
}
