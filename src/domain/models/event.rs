use tui_textarea::Input;

use super::ChatTurn;
use super::Message;
use super::ParticipantsBySource;
use super::PendingBinding;
use super::ProcessingReport;
use super::StartTurn;

pub enum Event {
    AvailableYears(Vec<i32>),
    Participants(String, u64, ParticipantsBySource),
    SessionStarted(StartTurn, Option<Message>),
    ChatReply(ChatTurn, Message),
    IdentitiesBound(PendingBinding, Option<String>),
    ProcessingFinished(Result<ProcessingReport, String>),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardPaste(String),
    TabClose(),
    TabNew(),
    TabNext(),
    TabPrevious(),
    YearNext(),
    YearPrevious(),
    ProcessData(),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
