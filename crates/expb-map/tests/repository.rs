use expb_map::{MappingStore, ProjectRepository};
use expb_model::{ColumnMappingEntry, ComponentId};
use expb_schema::SchemaRegistry;
use tempfile::TempDir;

fn sample_store() -> MappingStore {
    let mut store = MappingStore::new(SchemaRegistry::builtin());
    let img = ComponentId::new("img").unwrap();
    store
        .place_component(img.clone(), "image-keyboard-response")
        .unwrap();
    store
        .set_binding(&img, "stimulus", ColumnMappingEntry::csv("image"))
        .unwrap();
    store
        .set_binding(&img, "prompt", ColumnMappingEntry::typed("Press F or J"))
        .unwrap();
    store
}

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let repo = ProjectRepository::new(dir.path()).unwrap();
    let snapshot = sample_store().snapshot();

    let path = repo.save("Face Study", &snapshot).unwrap();
    assert!(path.ends_with("Face_Study.mapping.json"));
    assert!(repo.exists("Face Study"));

    let loaded = repo.load("Face Study").unwrap().expect("stored");
    assert_eq!(loaded, snapshot);

    let stored = repo.load_stored("Face Study").unwrap().unwrap();
    assert!(stored.saved_at.is_some());
    assert_eq!(stored.version, "1.0");
}

#[test]
fn stored_file_uses_tagged_entries() {
    let dir = TempDir::new().unwrap();
    let repo = ProjectRepository::new(dir.path()).unwrap();
    let path = repo.save("study", &sample_store().snapshot()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let mapping = &json["components"]["img"]["mapping"];
    assert_eq!(mapping["stimulus"]["source"], "csv");
    assert_eq!(mapping["stimulus"]["value"], "image");
    assert_eq!(mapping["prompt"]["source"], "typed");
    assert_eq!(json["components"]["img"]["type"], "image-keyboard-response");
}

#[test]
fn missing_project_loads_as_none() {
    let dir = TempDir::new().unwrap();
    let repo = ProjectRepository::new(dir.path()).unwrap();
    assert!(repo.load("nothing").unwrap().is_none());
    assert!(!repo.delete("nothing").unwrap());
}

#[test]
fn list_reports_counts_and_skips_foreign_files() {
    let dir = TempDir::new().unwrap();
    let repo = ProjectRepository::new(dir.path()).unwrap();
    repo.save("b-study", &sample_store().snapshot()).unwrap();
    repo.save("a-study", &Default::default()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
    std::fs::write(dir.path().join("broken.mapping.json"), "{").unwrap();

    let projects = repo.list().unwrap();
    let names: Vec<&str> = projects.iter().map(|p| p.project.as_str()).collect();
    assert_eq!(names, vec!["a-study", "b-study"]);
    assert_eq!(projects[1].component_count, 1);
    assert_eq!(projects[1].binding_count, 2);

    assert!(repo.delete("a-study").unwrap());
    assert_eq!(repo.list().unwrap().len(), 1);
}

#[test]
fn sink_writes_on_flush() {
    let dir = TempDir::new().unwrap();
    let repo = ProjectRepository::new(dir.path()).unwrap();
    let mut sink = repo.sink("autosaved");
    let mut store = sample_store();

    assert!(store.flush_autosave(&mut sink));
    assert_eq!(sink.writes(), 1);
    assert!(!store.flush_autosave(&mut sink));
    assert_eq!(sink.writes(), 1);

    let loaded = repo.load("autosaved").unwrap().unwrap();
    assert_eq!(loaded, store.snapshot());
}
