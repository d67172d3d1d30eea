//! Persistence tests: autosave files, history shape, and save slots.

use chargen_core::headless::HeadlessCreation;
use chargen_core::persist::{
    character_save_path, list_character_saves, load_character_or_new, save_character,
    SavedCharacter,
};
use chargen_core::{CharacterClass, CharacterRecord, Pronouns, Race, StatTable};
use tempfile::TempDir;

fn populated_record() -> CharacterRecord {
    let mut record = CharacterRecord::new();
    record.name = "Kara".to_string();
    record
        .set_race_and_class(Race::Elf, CharacterClass::Mage, StatTable::builtin())
        .unwrap();
    record.pronouns = Some(Pronouns::SheHer);
    record.attractiveness = 7;
    record
}

#[tokio::test]
async fn save_then_load_round_trips_identically() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("user.json");

    for record in [CharacterRecord::new(), populated_record()] {
        save_character(&record, &path).await.unwrap();
        let loaded = load_character_or_new(&path).await;
        assert_eq!(loaded, record);
    }
}

#[tokio::test]
async fn autosave_is_written_after_every_trigger() {
    let temp_dir = TempDir::new().unwrap();
    let mut creation = HeadlessCreation::sample(temp_dir.path()).await.unwrap();
    let path = temp_dir.path().join("user.json");

    creation.send("Kara").await.unwrap();
    let on_disk = load_character_or_new(&path).await;
    assert_eq!(on_disk.name, "Kara");
    assert_eq!(on_disk.race, None);

    creation.send("Elf").await.unwrap();
    let on_disk = load_character_or_new(&path).await;
    assert_eq!(on_disk.race, Some(Race::Elf));

    creation.send("Mage").await.unwrap();
    let on_disk = load_character_or_new(&path).await;
    assert_eq!(on_disk.class, Some(CharacterClass::Mage));
    assert_eq!(on_disk.attributes, creation.character().attributes);
}

#[tokio::test]
async fn rejected_input_does_not_touch_the_autosave() {
    let temp_dir = TempDir::new().unwrap();
    let mut creation = HeadlessCreation::sample(temp_dir.path()).await.unwrap();
    let path = temp_dir.path().join("user.json");

    creation.send("Kara").await.unwrap();
    let before = load_character_or_new(&path).await;

    creation.send("Robot").await.unwrap();
    let after = load_character_or_new(&path).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn history_file_matches_the_documented_shape() {
    let temp_dir = TempDir::new().unwrap();
    let mut creation = HeadlessCreation::sample(temp_dir.path()).await.unwrap();
    creation.send("Kara").await.unwrap();

    let content =
        std::fs::read_to_string(temp_dir.path().join("DialogueHistory.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();

    let entries = value["History"].as_array().expect("History array");
    // Start prompt, player echo, next prompt.
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["Speaker"], "Narrator");
    assert_eq!(entries[1]["Speaker"], "Player");
    assert_eq!(entries[1]["Text"], "Kara");
    for entry in entries {
        assert!(entry["Timestamp"].is_string());
    }
}

#[tokio::test]
async fn history_is_rewritten_after_every_line() {
    let temp_dir = TempDir::new().unwrap();
    let mut creation = HeadlessCreation::sample(temp_dir.path()).await.unwrap();
    let path = temp_dir.path().join("DialogueHistory.json");

    let count = |content: &str| -> usize {
        let value: serde_json::Value = serde_json::from_str(content).unwrap();
        value["History"].as_array().unwrap().len()
    };

    assert_eq!(count(&std::fs::read_to_string(&path).unwrap()), 1);
    creation.send("   ").await.unwrap();
    assert_eq!(count(&std::fs::read_to_string(&path).unwrap()), 2);
    // A real answer adds the player echo and the next prompt.
    creation.send("Kara").await.unwrap();
    assert_eq!(count(&std::fs::read_to_string(&path).unwrap()), 4);
}

#[tokio::test]
async fn completed_character_saves_to_a_named_slot() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("run");
    let slots_dir = temp_dir.path().join("slots");

    let mut creation = HeadlessCreation::sample(&data_dir).await.unwrap();
    creation
        .run_script(&["Kara", "Elf", "Mage", "she/her", "7", "onward"])
        .await
        .unwrap();

    let saved = SavedCharacter::new(creation.character().clone());
    std::fs::create_dir_all(&slots_dir).unwrap();
    let path = character_save_path(&slots_dir, &creation.character().name);
    saved.save_json(&path).await.unwrap();

    let loaded = SavedCharacter::load_json(&path).await.unwrap();
    assert_eq!(&loaded.character, creation.character());
    assert!(loaded.metadata.complete);

    let listed = list_character_saves(&slots_dir).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].metadata.name, "Kara");
    assert_eq!(listed[0].metadata.race, "Elf");
    assert_eq!(listed[0].metadata.class, "Mage");
}
