use capyxliff::{
    CursorState, Error, LoadOptions, Side, TagKind, TagToken, TargetState, TranslationGrid, Xliff,
    XmlDocument, all_units, markup, open_document, save_document,
};
use indoc::indoc;
use std::{cell::RefCell, fs, rc::Rc};
use tempfile::TempDir;

const HELLO: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" xmlns:capy="http://capybaratranslation.com/capyxliff/1.0" version="1.2" capy:version="1.0">
      <file original="hello.docx" source-language="en" target-language="fr" datatype="x-docx">
        <body>
          <group id="g1" capy:original-id="p1">
            <trans-unit id="u1" capy:original-id="s1" translate="yes">
              <source>Hello {1>world&lt;1}!</source>
              <target></target>
              <capy:source-props>
                <capy:tag id="1">
                  <capy:content></capy:content>
                </capy:tag>
              </capy:source-props>
              <capy:target-props/>
            </trans-unit>
          </group>
        </body>
      </file>
    </xliff>
"#};

fn write_sample(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_copy_tag_twice_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "hello.xlf", HELLO);

    let mut document = Xliff::load(&path).unwrap();
    let unit = document.trans_unit_mut(0).unwrap();
    assert_eq!(unit.target.text, "");

    let first = unit.copy_next_tag_from_source(&CursorState::at(0));
    let cursor = first.edit().unwrap().cursor.clone();
    unit.copy_next_tag_from_source(&cursor);

    let tokens = markup::tag_tokens(&unit.target.text);
    assert_eq!(tokens, vec![TagToken::start("1"), TagToken::end("1")]);
    assert_eq!(tokens[0].kind, TagKind::Start);
    assert_eq!(unit.tags.tags(Side::Target).len(), 1);
    assert_eq!(unit.find_tag_by_id("1", Side::Target).unwrap().content, "");

    let out = dir.path().join("out.xlf");
    document.save(&out).unwrap();
    let reloaded = Xliff::load(&out).unwrap();
    assert_eq!(reloaded, document);
    let saved = fs::read_to_string(&out).unwrap();
    assert!(saved.contains("<target>{1&gt;&lt;1}</target>"));
}

#[test]
fn test_load_save_reload_is_stable() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "hello.xlf", HELLO);
    let document = Xliff::load(&path).unwrap();

    let first = dir.path().join("first.xlf");
    let second = dir.path().join("second.xlf");
    document.save(&first).unwrap();
    Xliff::load(&first).unwrap().save(&second).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_flatten_is_stable_across_calls() {
    let document = Xliff::from_str(HELLO).unwrap();
    let first: Vec<_> = document.trans_units().map(|u| u.id.clone()).collect();
    let second: Vec<_> = document.trans_units().map(|u| u.id.clone()).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![Some("u1".to_string())]);
}

#[test]
fn test_missing_file_is_load_failure() {
    let dir = TempDir::new().unwrap();
    let err = Xliff::load(dir.path().join("missing.xlf")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.is_load_failure());
}

#[test]
fn test_not_well_formed_is_load_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "broken.xlf", "<xliff><file></xliff>");
    let err = Xliff::load(&path).unwrap_err();
    assert!(err.is_load_failure());
}

#[test]
fn test_relaxed_limits_for_large_files() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "hello.xlf", HELLO);
    let options = LoadOptions::new().with_huge_file_threshold(10);
    let document = Xliff::load_with(&path, &options).unwrap();
    assert_eq!(document.unit_count(), 1);
}

#[test]
fn test_utf16_input_with_bom() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("utf16.xlf");
    let text = HELLO.replace("encoding=\"utf-8\"", "encoding=\"utf-16\"");
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&path, bytes).unwrap();

    let document = Xliff::load(&path).unwrap();
    assert_eq!(document.trans_unit(0).unwrap().source.text, "Hello {1>world<1}!");
}

#[test]
fn test_failed_save_keeps_document_usable() {
    let dir = TempDir::new().unwrap();
    let mut document = Xliff::from_str(HELLO).unwrap();
    let err = document
        .save(dir.path().join("no-such-dir").join("out.xlf"))
        .unwrap_err();
    assert!(matches!(err, Error::Save { .. }));
    assert!(!err.is_load_failure());

    document.trans_unit_mut(0).unwrap().target.state = TargetState::Translated;
    let out = dir.path().join("retry.xlf");
    document.save(&out).unwrap();
    let saved = fs::read_to_string(&out).unwrap();
    assert!(saved.contains(r#"<target state="translated"></target>"#));
}

#[test]
fn test_grid_open_edit_save() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "hello.xlf", HELLO);
    let mut grid = TranslationGrid::open(&path, &LoadOptions::default()).unwrap();
    assert_eq!(grid.current_row(), Some(0));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    grid.subscribe(move |event| sink.borrow_mut().push(event.text.clone()));

    grid.set_segment_text(0, Side::Target, "Bonjour le monde !").unwrap();
    grid.copy_next_tag_from_source(0, &CursorState::selecting(8, 16))
        .unwrap();
    assert_eq!(
        grid.segment_text(0, Side::Target),
        Some("Bonjour {1>le monde<1} !")
    );
    assert_eq!(seen.borrow().len(), 2);

    grid.save().unwrap();
    assert!(!grid.is_modified());
    let reloaded = Xliff::load(&path).unwrap();
    assert_eq!(
        reloaded.trans_unit(0).unwrap().target.text,
        "Bonjour {1>le monde<1} !"
    );
}

#[test]
fn test_editing_surface_functions() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "hello.xlf", HELLO);

    let mut document = open_document(&path).unwrap();
    let ids: Vec<_> = all_units(&document)
        .iter()
        .map(|unit| unit.id_or_empty().to_string())
        .collect();
    assert_eq!(ids, vec!["u1"]);

    document
        .trans_unit_mut(0)
        .unwrap()
        .set_segment_text(Side::Target, "Bonjour {1>monde<1} !");
    let out = dir.path().join("surface.xlf");
    save_document(&document, &out).unwrap();

    let reloaded = open_document(&out).unwrap();
    assert_eq!(
        all_units(&reloaded)[0].segment_text(Side::Target),
        "Bonjour {1>monde<1} !"
    );
    assert!(save_document(&reloaded, dir.path().join("nope").join("x.xlf")).is_err());
}

#[test]
fn test_crlf_file_loads_with_plain_newlines() {
    let dir = TempDir::new().unwrap();
    let text = HELLO
        .replace("\n", "\r\n")
        .replace("Hello {1>world&lt;1}!", "Hello\r\n{1>world&lt;1}!");
    let path = write_sample(&dir, "crlf.xlf", &text);

    let document = Xliff::load(&path).unwrap();
    assert_eq!(
        document.trans_unit(0).unwrap().source.text,
        "Hello\n{1>world<1}!"
    );

    let out = dir.path().join("out.xlf");
    document.save(&out).unwrap();
    assert!(!fs::read_to_string(&out).unwrap().contains('\r'));
}
