use anyhow::Result;

use super::SessionError;
use super::Sessions;
use super::View;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::ParticipantsBySource;
use crate::domain::models::SessionState;
use crate::domain::services::BindingError;
use crate::domain::services::PersonaBinder;

fn binder(year: i32) -> PersonaBinder {
    let mut candidates = ParticipantsBySource::new();
    candidates.insert(
        "whatsapp".to_string(),
        vec!["Alex".to_string(), "Sam".to_string()],
    );
    candidates.insert("instagram".to_string(), vec![]);
    return PersonaBinder::new(year, candidates);
}

fn bound_session(sessions: &mut Sessions, year: i32) -> Result<String> {
    let id = sessions.create(year)?;
    let mut binder = binder(year);
    binder.select("whatsapp", "Alex")?;
    let pending = sessions.begin_binding(&id, &binder)?;
    sessions.commit_binding(pending)?;
    return Ok(id);
}

mod create {
    use super::*;

    #[test]
    fn it_creates_an_active_unbound_session() -> Result<()> {
        let mut sessions = Sessions::default();
        assert_eq!(sessions.view(), View::Default);

        let id = sessions.create(2020)?;
        let session = sessions.get(&id).unwrap();

        assert_eq!(sessions.active_id(), Some(id.as_str()));
        assert_eq!(sessions.view(), View::Conversation);
        assert_eq!(session.year(), 2020);
        assert!(session.messages().is_empty());
        assert!(session.selected_identities().is_empty());
        assert_eq!(session.state(), SessionState::Unbound);

        return Ok(());
    }

    #[test]
    fn it_never_exceeds_the_ceiling() -> Result<()> {
        let mut sessions = Sessions::default();
        for year in 2016..2021 {
            sessions.create(year)?;
        }
        let last_active = sessions.active_id().unwrap().to_string();

        for year in 2021..2030 {
            assert_eq!(sessions.create(year), Err(SessionError::AtCapacity(5)));
            assert_eq!(sessions.len(), 5);
        }

        assert_eq!(sessions.active_id(), Some(last_active.as_str()));
        assert_eq!(
            SessionError::AtCapacity(5).to_string(),
            "Maximum of 5 tabs reached."
        );

        return Ok(());
    }

    #[test]
    fn it_assigns_unique_ids() -> Result<()> {
        let mut sessions = Sessions::new(50);
        let mut ids = (0..50)
            .map(|_| return sessions.create(2020))
            .collect::<Result<Vec<String>, SessionError>>()?;
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);

        return Ok(());
    }

    #[test]
    fn it_opens_existing_year_instead_of_duplicating() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = sessions.create(2019)?;
        sessions.create(2020)?;

        assert_eq!(sessions.open_year(2019)?, first);
        assert_eq!(sessions.active_id(), Some(first.as_str()));
        assert_eq!(sessions.len(), 2);

        sessions.open_year(2021)?;
        assert_eq!(sessions.len(), 3);

        return Ok(());
    }
}

mod switch_to {
    use super::*;

    #[test]
    fn it_ignores_unknown_ids() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;

        assert!(!sessions.switch_to("nope"));
        assert_eq!(sessions.active_id(), Some(id.as_str()));

        return Ok(());
    }

    #[test]
    fn it_keeps_content_of_every_session() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = bound_session(&mut sessions, 2019)?;
        let turn = sessions.begin_send(&first, "hello")?;
        sessions.complete_send(&turn, Message::new(Author::Ai, "hey"));
        let second = sessions.create(2020)?;

        assert!(sessions.switch_to(&first));
        assert!(sessions.switch_to(&second));
        assert!(sessions.switch_to(&first));
        assert_eq!(sessions.get(&first).unwrap().messages().len(), 2);

        return Ok(());
    }

    #[test]
    fn it_cycles_through_tabs() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = sessions.create(2019)?;
        let second = sessions.create(2020)?;

        assert!(sessions.cycle(1));
        assert_eq!(sessions.active_id(), Some(first.as_str()));
        assert!(sessions.cycle(-1));
        assert_eq!(sessions.active_id(), Some(second.as_str()));

        return Ok(());
    }
}

mod close {
    use super::*;

    #[test]
    fn it_refuses_to_close_the_last_session() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;

        assert_eq!(sessions.close(&id), Err(SessionError::LastSession));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.active_id(), Some(id.as_str()));
        assert_eq!(sessions.view(), View::Conversation);

        return Ok(());
    }

    #[test]
    fn it_activates_the_left_neighbour() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = sessions.create(2018)?;
        let second = sessions.create(2019)?;
        let third = sessions.create(2020)?;

        sessions.switch_to(&second);
        sessions.close(&second)?;
        assert_eq!(sessions.active_id(), Some(first.as_str()));

        sessions.switch_to(&first);
        sessions.close(&first)?;
        assert_eq!(sessions.active_id(), Some(third.as_str()));

        return Ok(());
    }

    #[test]
    fn it_keeps_the_active_session_when_closing_another() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = sessions.create(2018)?;
        let second = sessions.create(2019)?;

        sessions.close(&first)?;
        assert_eq!(sessions.active_id(), Some(second.as_str()));

        return Ok(());
    }

    #[test]
    fn it_reports_unknown_ids() -> Result<()> {
        let mut sessions = Sessions::default();
        sessions.create(2018)?;
        sessions.create(2019)?;

        assert_eq!(
            sessions.close("nope"),
            Err(SessionError::NotFound("nope".to_string()))
        );
        assert_eq!(sessions.len(), 2);

        return Ok(());
    }
}

mod change_year {
    use super::*;

    #[test]
    fn it_resets_messages_and_identities() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2019)?;
        let turn = sessions.begin_send(&id, "hello")?;
        sessions.complete_send(&turn, Message::new(Author::Ai, "hey"));

        sessions.change_year(&id, 2021)?;
        let session = sessions.get(&id).unwrap();

        assert_eq!(session.id(), id);
        assert_eq!(session.year(), 2021);
        assert!(session.messages().is_empty());
        assert!(session.selected_identities().is_empty());
        assert_eq!(session.state(), SessionState::Unbound);

        return Ok(());
    }

    #[test]
    fn it_drops_replies_for_the_previous_year() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2019)?;
        let turn = sessions.begin_send(&id, "hello")?;

        sessions.change_year(&id, 2021)?;
        assert!(sessions.get(&id).unwrap().is_awaiting_response());

        sessions.complete_send(&turn, Message::new(Author::Ai, "late"));
        let session = sessions.get(&id).unwrap();
        assert!(session.messages().is_empty());
        assert!(!session.is_awaiting_response());

        return Ok(());
    }
}

mod binding {
    use super::*;

    #[test]
    fn it_rejects_missing_required_sources_without_mutation() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;

        let res = sessions.begin_binding(&id, &binder(2020));
        assert_eq!(
            res,
            Err(SessionError::Binding(BindingError::MissingSelections(
                vec!["whatsapp".to_string()]
            )))
        );

        let session = sessions.get(&id).unwrap();
        assert!(session.selected_identities().is_empty());
        assert!(!session.is_awaiting_response());

        return Ok(());
    }

    #[test]
    fn it_commits_only_after_acknowledgment() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;
        let mut binder = binder(2020);
        binder.select("whatsapp", "Alex")?;

        let pending = sessions.begin_binding(&id, &binder)?;
        assert!(sessions.get(&id).unwrap().selected_identities().is_empty());
        assert!(sessions.get(&id).unwrap().is_awaiting_response());

        sessions.commit_binding(pending)?;
        let session = sessions.get(&id).unwrap();
        assert_eq!(
            session.selected_identities().get("whatsapp"),
            Some(&"Alex".to_string())
        );
        assert_eq!(session.state(), SessionState::BoundEmpty);
        assert_eq!(session.persona_label(), "Alex (2020)");

        return Ok(());
    }

    #[test]
    fn it_binds_sources_without_candidates() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2019)?;
        let mut candidates = ParticipantsBySource::new();
        candidates.insert("whatsapp".to_string(), vec![]);

        let pending = sessions.begin_binding(&id, &PersonaBinder::new(2019, candidates))?;
        sessions.commit_binding(pending)?;

        let session = sessions.get(&id).unwrap();
        assert_eq!(session.state(), SessionState::BoundEmpty);
        assert_eq!(session.persona_label(), "You (2019)");
        assert!(sessions.begin_start(&id).is_some());

        return Ok(());
    }

    #[test]
    fn it_rolls_back_a_refused_binding() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;
        let mut binder = binder(2020);
        binder.select("whatsapp", "Alex")?;

        let pending = sessions.begin_binding(&id, &binder)?;
        sessions.abort_binding(&pending);

        let session = sessions.get(&id).unwrap();
        assert!(session.selected_identities().is_empty());
        assert!(!session.is_awaiting_response());

        return Ok(());
    }

    #[test]
    fn it_refuses_to_rebind_in_place() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2020)?;
        let mut binder = binder(2020);
        binder.select("whatsapp", "Sam")?;

        assert_eq!(
            sessions.begin_binding(&id, &binder),
            Err(SessionError::AlreadyBound(2020))
        );

        return Ok(());
    }

    #[test]
    fn it_refuses_a_binder_for_another_year() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;
        let mut binder = binder(2019);
        binder.select("whatsapp", "Alex")?;

        assert_eq!(
            sessions.begin_binding(&id, &binder),
            Err(SessionError::Stale(2019))
        );

        return Ok(());
    }

    #[test]
    fn it_does_not_commit_after_a_year_change() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;
        let mut binder = binder(2020);
        binder.select("whatsapp", "Alex")?;

        let pending = sessions.begin_binding(&id, &binder)?;
        sessions.change_year(&id, 2018)?;

        assert_eq!(
            sessions.commit_binding(pending),
            Err(SessionError::Stale(2020))
        );
        assert!(sessions.get(&id).unwrap().selected_identities().is_empty());

        return Ok(());
    }
}

mod start {
    use super::*;

    #[test]
    fn it_starts_bound_sessions_once() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2020)?;

        let turn = sessions.begin_start(&id).unwrap();
        assert_eq!(turn.year, 2020);
        assert!(sessions.get(&id).unwrap().is_awaiting_response());
        assert!(sessions.begin_start(&id).is_none());

        sessions.complete_start(&turn, None);
        assert!(!sessions.get(&id).unwrap().is_awaiting_response());
        assert!(sessions.begin_start(&id).is_none());

        return Ok(());
    }

    #[test]
    fn it_skips_unbound_sessions() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;
        assert!(sessions.begin_start(&id).is_none());

        return Ok(());
    }

    #[test]
    fn it_records_start_failures_as_system_messages() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2020)?;
        let turn = sessions.begin_start(&id).unwrap();

        sessions.complete_start(&turn, Some(Message::system("Error: nope")));
        let session = sessions.get(&id).unwrap();
        assert_eq!(session.messages().len(), 1);
        assert!(session.messages()[0].is_system());
        assert_eq!(session.state(), SessionState::Active);

        return Ok(());
    }

    #[test]
    fn it_starts_again_after_rebinding_a_new_year() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2020)?;
        let turn = sessions.begin_start(&id).unwrap();
        sessions.complete_start(&turn, None);

        sessions.change_year(&id, 2019)?;
        let mut binder = binder(2019);
        binder.select("whatsapp", "Sam")?;
        let pending = sessions.begin_binding(&id, &binder)?;
        sessions.commit_binding(pending)?;

        let turn = sessions.begin_start(&id).unwrap();
        assert_eq!(turn.year, 2019);

        return Ok(());
    }
}

mod send {
    use super::*;

    #[test]
    fn it_ignores_blank_messages() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2020)?;

        assert_eq!(
            sessions.begin_send(&id, "   \n\t"),
            Err(SessionError::EmptyMessage)
        );
        let session = sessions.get(&id).unwrap();
        assert!(session.messages().is_empty());
        assert!(!session.is_awaiting_response());

        return Ok(());
    }

    #[test]
    fn it_requires_a_persona() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = sessions.create(2020)?;

        assert_eq!(sessions.begin_send(&id, "hi"), Err(SessionError::Unbound));

        return Ok(());
    }

    #[test]
    fn it_serializes_sends_within_a_session() -> Result<()> {
        let mut sessions = Sessions::default();
        let id = bound_session(&mut sessions, 2020)?;

        let turn = sessions.begin_send(&id, "first")?;
        assert_eq!(sessions.begin_send(&id, "second"), Err(SessionError::Busy));
        assert_eq!(
            sessions.get(&id).unwrap().state(),
            SessionState::AwaitingResponse
        );

        sessions.complete_send(&turn, Message::new(Author::Ai, "reply"));
        assert!(sessions.begin_send(&id, "second").is_ok());

        return Ok(());
    }

    #[test]
    fn it_keeps_sessions_independent() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = bound_session(&mut sessions, 2019)?;
        let second = bound_session(&mut sessions, 2020)?;

        let first_turn = sessions.begin_send(&first, "one")?;
        let second_turn = sessions.begin_send(&second, "two")?;

        sessions.complete_send(&second_turn, Message::new(Author::Ai, "two back"));
        assert!(sessions.get(&first).unwrap().is_awaiting_response());
        assert!(!sessions.get(&second).unwrap().is_awaiting_response());

        sessions.complete_send(&first_turn, Message::system("Error: nope"));

        let first_texts = sessions
            .get(&first)
            .unwrap()
            .messages()
            .iter()
            .map(|msg| return msg.text.to_string())
            .collect::<Vec<String>>();
        let second_texts = sessions
            .get(&second)
            .unwrap()
            .messages()
            .iter()
            .map(|msg| return msg.text.to_string())
            .collect::<Vec<String>>();

        assert_eq!(first_texts, vec!["one", "Error: nope"]);
        assert_eq!(second_texts, vec!["two", "two back"]);

        return Ok(());
    }

    #[test]
    fn it_ignores_replies_for_closed_sessions() -> Result<()> {
        let mut sessions = Sessions::default();
        let first = bound_session(&mut sessions, 2019)?;
        bound_session(&mut sessions, 2020)?;

        let turn = sessions.begin_send(&first, "one")?;
        sessions.close(&first)?;
        sessions.complete_send(&turn, Message::new(Author::Ai, "late"));

        assert_eq!(sessions.len(), 1);
        assert!(sessions.get(&first).is_none());

        return Ok(());
    }
}
