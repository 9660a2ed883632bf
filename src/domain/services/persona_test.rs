use anyhow::Result;
use test_utils::participants_fixture;

use super::BindingError;
use super::PersonaBinder;
use crate::domain::models::ParticipantsBySource;
use crate::domain::models::ParticipantsResponse;

fn fixture_binder() -> Result<PersonaBinder> {
    let res: ParticipantsResponse = serde_json::from_str(participants_fixture())?;
    return Ok(PersonaBinder::new(2020, res.participants_by_source));
}

#[test]
fn it_lists_missing_sources_with_candidates_only() -> Result<()> {
    let binder = fixture_binder()?;
    assert_eq!(
        binder.missing_sources(),
        vec!["discord".to_string(), "whatsapp".to_string()]
    );

    return Ok(());
}

#[test]
fn it_rejects_partial_binding_with_one_aggregated_error() -> Result<()> {
    let mut binder = fixture_binder()?;
    binder.select("whatsapp", "Alex")?;

    let err = binder.confirm().unwrap_err();
    assert_eq!(
        err,
        BindingError::MissingSelections(vec!["discord".to_string()])
    );
    assert_eq!(err.to_string(), "Please select your name for Discord.");

    return Ok(());
}

#[test]
fn it_names_every_missing_source() -> Result<()> {
    let binder = fixture_binder()?;
    let err = binder.confirm().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please select your name for Discord, Whatsapp."
    );

    return Ok(());
}

#[test]
fn it_confirms_when_only_optional_sources_are_unpicked() -> Result<()> {
    let mut binder = fixture_binder()?;
    binder.select("whatsapp", "Alex")?;
    binder.select("discord", "alex#0001")?;

    let binding = binder.confirm()?;
    assert_eq!(binding.len(), 2);
    assert_eq!(binding.get("whatsapp"), Some(&"Alex".to_string()));
    assert_eq!(binding.get("instagram"), None);

    return Ok(());
}

#[test]
fn it_rejects_unknown_sources_and_names() -> Result<()> {
    let mut binder = fixture_binder()?;
    assert!(binder.select("myspace", "Tom").is_err());
    assert!(binder.select("whatsapp", "Nobody").is_err());
    assert!(binder.tentative().is_empty());

    return Ok(());
}

#[test]
fn it_binds_empty_names_when_no_source_has_candidates() -> Result<()> {
    let mut candidates = ParticipantsBySource::new();
    candidates.insert("whatsapp".to_string(), vec![]);
    candidates.insert("discord".to_string(), vec![]);
    let binder = PersonaBinder::new(2019, candidates);

    let binding = binder.confirm()?;
    assert_eq!(binding.len(), 2);
    assert_eq!(binding.get("whatsapp"), Some(&"".to_string()));
    assert_eq!(binding.get("discord"), Some(&"".to_string()));

    return Ok(());
}

#[test]
fn it_rejects_confirming_without_any_sources() {
    let empty = PersonaBinder::new(2019, ParticipantsBySource::new());
    assert_eq!(empty.confirm(), Err(BindingError::NoCandidates(2019)));
}

#[test]
fn it_clears_a_selection() -> Result<()> {
    let mut binder = fixture_binder()?;
    binder.select("whatsapp", "Sam")?;
    binder.clear("whatsapp");
    assert_eq!(binder.selection("whatsapp"), None);

    return Ok(());
}

#[test]
fn it_cycles_candidates_under_the_cursor() -> Result<()> {
    let mut binder = fixture_binder()?;

    // Sources are ordered: discord, instagram, whatsapp.
    binder.cursor_down();
    binder.cursor_down();
    assert_eq!(binder.cursor(), 2);
    binder.cursor_down();
    assert_eq!(binder.cursor(), 2);

    binder.cycle(true);
    assert_eq!(binder.selection("whatsapp"), Some("Alex"));
    binder.cycle(true);
    assert_eq!(binder.selection("whatsapp"), Some("Sam"));
    binder.cycle(false);
    binder.cycle(false);
    assert_eq!(binder.selection("whatsapp"), Some("Jordan"));

    binder.cursor_up();
    binder.cycle(true);
    assert_eq!(binder.selection("instagram"), None);

    return Ok(());
}
