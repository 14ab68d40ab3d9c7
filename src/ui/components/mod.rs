mod command_input;
mod confirm;
mod input;
mod key_result;
mod notice;
mod option_picker;
mod resident_form;
mod resident_panel;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use notice::{Notice, NoticeLevel, Notifications};
pub use option_picker::{OptionPicker, PickerEvent};
pub use resident_form::{FormEvent, ResidentForm};
pub use resident_panel::render_resident;
pub use search_input::{SearchEvent, SearchInput};
