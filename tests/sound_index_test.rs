// Sound reference table loading and lookup

use std::io::Write;

use musicxml_model::{SoundIndex, SoundTableError};

/// Write a DOCTYPE'd sound table with `brass.trumpet` after twelve entries
fn write_table() -> tempfile::NamedTempFile {
    let ids = [
        "brass.alphorn",
        "brass.alto-horn",
        "brass.baritone-horn",
        "brass.bugle",
        "brass.cornet",
        "brass.euphonium",
        "brass.flugelhorn",
        "brass.french-horn",
        "brass.mellophone",
        "brass.sousaphone",
        "brass.trombone",
        "brass.trombone.bass",
        "brass.trumpet",
        "brass.tuba",
    ];

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>").unwrap();
    writeln!(
        file,
        "<!DOCTYPE sounds PUBLIC \"-//Recordare//DTD MusicXML 4.0 Sounds//EN\" \"http://www.musicxml.org/dtds/sounds.dtd\">"
    )
    .unwrap();
    writeln!(file, "<sounds>").unwrap();
    for id in ids {
        writeln!(file, "  <sound id=\"{}\"/>", id).unwrap();
    }
    writeln!(file, "</sounds>").unwrap();
    file
}

#[test]
fn test_load_and_lookup() {
    let file = write_table();
    let index = SoundIndex::load(file.path()).expect("table loads");

    assert_eq!(index.lookup("brass.trumpet"), Some(12));
    assert_eq!(index.lookup("brass.alphorn"), Some(0));
    assert_eq!(index.lookup("nonexistent.sound"), None);
    assert_eq!(index.len(), 14);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SoundIndex::load(dir.path().join("sounds.xml")).unwrap_err();
    assert!(matches!(err, SoundTableError::Io(_)));
}

#[test]
fn test_index_is_shared_across_threads() {
    let file = write_table();
    let index = SoundIndex::load(file.path()).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| assert_eq!(index.lookup("brass.tuba"), Some(13)));
        }
    });
}
