//! Per-action instructions used when the model is asked to construct the
//! final JSON for an action kind it already chose.
use crate::action::ActionKind;

const CLICK: &str = "\
You have selected the `click` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"click\", \"index\": <target_index>}\n\
Guidelines:\n\
- The index must correspond to a visible and interactable UI element on the screen.\n\
- The click will be performed at the center of the element's bounding box.\n\
- Do not click on elements that are disabled, hidden, or overlapped by other UI elements.\n\
- Do not click on decorative or non-interactive elements (such as icons or separators).\n\
- If multiple elements have similar text, use the index that matches the intended target in the UI list.\n\
- Only include the \"index\" key, do not add extra fields.\n\
Common mistakes:\n\
- Using an index that is not present in the current UI element list.\n\
- Using an index for an element that is not visible or interactable (e.g., off-screen, covered, or grayed out).\n\
- Clicking on a label or static text instead of a button or input field.\n\
- Adding unnecessary keys or fields to the JSON.\n\
- Failing to update the index if the UI changes after a previous action.\n\
Example: {\"action_type\": \"click\", \"index\": 2}";

const LONG_PRESS: &str = "\
You have selected the `long_press` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"long_press\", \"index\": <target_index>}\n\
Guidelines:\n\
- The index must correspond to a visible and interactable UI element on the screen.\n\
- The press will be performed at the center of the element's bounding box and held for a longer duration.\n\
- Do not long press on elements that are disabled, hidden, overlapped, or non-interactive.\n\
- If multiple elements have similar text, use the index that matches the intended target in the UI list.\n\
- Only include the \"index\" key, do not add extra fields.\n\
Common mistakes:\n\
- Using an index that is not present in the current UI element list.\n\
- Using an index for an element that is not visible or interactable (e.g., off-screen, covered, or grayed out).\n\
- Long pressing on a label or static text instead of a button, input field, or selectable item.\n\
- Adding unnecessary keys or fields to the JSON.\n\
- Failing to update the index if the UI changes after a previous action.\n\
Example: {\"action_type\": \"long_press\", \"index\": 1}";

const INPUT_TEXT: &str = "\
You have selected the `input_text` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"input_text\", \"text\": <text_input>, \"index\": <target_index>}\n\
Guidelines:\n\
- \"text\" is the exact string to type into the field.\n\
- \"index\" must correspond to a visible and editable text field on the screen.\n\
- The field is focused first, then the text is typed, and finally enter is pressed.\n\
- Do not use indices for non-editable or decorative elements.\n\
- Do not include extra keys or fields.\n\
- If multiple fields are similar, use the index that matches the intended target in the UI list.\n\
Common mistakes:\n\
- Omitting either \"text\" or \"index\".\n\
- Using an index for an element that is not visible, not editable, or not a text field.\n\
- Typing into a label, button, or static text instead of an input field.\n\
- Adding unnecessary keys or fields to the JSON.\n\
- Failing to update the index if the UI changes after a previous action.\n\
Example: {\"action_type\": \"input_text\", \"text\": \"hello\", \"index\": 3}";

const FILL_FORM: &str = "\
You have selected the `fill_form` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"fill_form\", \"form\": [\n\
  {\"text\": <text_input_1>, \"index\": <target_index_1>},\n\
  {\"text\": <text_input_2>, \"index\": <target_index_2>}\n\
]}\n\
Guidelines:\n\
- Do not click on a dropdown menu or a non-editable field.\n\
- Each item in \"form\" must have \"text\" and \"index\".\n\
- Each field is focused by index, then the text is typed, and finally enter is pressed.\n\
- Only use indices for visible and **editable** text fields.\n\
- Do not add extra keys or fields.\n\
- If multiple fields are similar, use the index that matches the intended target in the UI list.\n\
- The order of fields in the form should match the logical order of filling the form on the screen.\n\
Common mistakes:\n\
- Clicking the dropdown menu, which is not editable, instead of the input field.\n\
- Omitting either \"text\" or \"index\".\n\
- Using an index for an element that is not visible, not editable, or not a text field.\n\
- Typing into a label, button, or static text instead of an input field.\n\
- Adding unnecessary keys or fields to the JSON.\n\
- Using out-of-range indices that do not correspond to any UI element.\n\
Example: {\"action_type\": \"fill_form\", \"form\": [{\"text\": \"John\", \"index\": 2}, {\"text\": \"Doe\", \"index\": 3}]}";

const ANSWER: &str = "\
You have selected the `answer` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"answer\", \"text\": <answer_text>}\n\
Guidelines:\n\
- \"text\" should be a clear, concise, and direct answer to the user's question or request.\n\
- The answer should be factually correct based on the information available on the device.\n\
- Do not include extra keys or fields.\n\
- If the answer cannot be determined, state so clearly in the text.\n\
- If the answer has multiple items, format it as a single string (e.g., comma-separated).\n\
Common mistakes:\n\
- Forgetting the \"text\" key.\n\
- Including UI element indices, JSON, or code in the answer text.\n\
- Using vague or incomplete answers (e.g., just saying \"done\" or \"okay\").\n\
Example: {\"action_type\": \"answer\", \"text\": \"You have no events today.\"}";

const STATUS: &str = "\
You have selected the `status` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"status\", \"goal_status\": <complete|infeasible>}\n\
Guidelines:\n\
- Use \"complete\" if the task is done, \"infeasible\" if it cannot be done.\n\
- Only use the allowed values for \"goal_status\".\n\
- Do not add extra keys or fields.\n\
Common mistakes:\n\
- Misspelling \"goal_status\" or using an invalid value.\n\
- Adding unnecessary keys or fields to the JSON.\n\
Example: {\"action_type\": \"status\", \"goal_status\": \"complete\"}";

const KEYBOARD_ENTER: &str = "\
You have selected the `keyboard_enter` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"keyboard_enter\"}\n\
Guidelines:\n\
- No extra keys or fields.\n\
- Use this action only when you want to press the Enter key on the keyboard.\n\
Example: {\"action_type\": \"keyboard_enter\"}";

const NAVIGATE_HOME: &str = "\
You have selected the `navigate_home` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"navigate_home\"}\n\
Guidelines:\n\
- No extra keys or fields.\n\
- Use this action only to return to the home screen.\n\
Example: {\"action_type\": \"navigate_home\"}";

const NAVIGATE_BACK: &str = "\
You have selected the `navigate_back` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"navigate_back\"}\n\
Guidelines:\n\
- No extra keys or fields.\n\
- Use this action only to press the back button.\n\
Example: {\"action_type\": \"navigate_back\"}";

const SCROLL: &str = "\
You have selected the `scroll` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"scroll\", \"direction\": <up|down|left|right>, \"index\": <optional_target_index>}\n\
Guidelines:\n\
- \"direction\" must be one of up, down, left, right.\n\
- \"index\" is optional; omit it to scroll the whole screen.\n\
- Only use indices for visible and scrollable UI elements.\n\
- Do not add extra keys or fields.\n\
- Make sure the direction matches the intended scroll (e.g., \"down\" to see content below).\n\
Common mistakes:\n\
- Misspelling direction or using an invalid value.\n\
- Using an index for a non-scrollable or invisible element.\n\
Example: {\"action_type\": \"scroll\", \"direction\": \"down\", \"index\": 2}";

const OPEN_APP: &str = "\
You have selected the `open_app` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"open_app\", \"app_name\": <name>}\n\
Guidelines:\n\
- \"app_name\" must be the exact name of the app as it appears on the device.\n\
- No extra keys or fields.\n\
Common mistakes:\n\
- Misspelling the app name or using an unofficial name.\n\
Example: {\"action_type\": \"open_app\", \"app_name\": \"Calendar\"}";

const WAIT: &str = "\
You have selected the `wait` action. Now construct the JSON for this action.\n\
Format: {\"action_type\": \"wait\"}\n\
Guidelines:\n\
- No extra keys or fields.\n\
- Use this action to wait for the screen to update or for a process to complete.\n\
Example: {\"action_type\": \"wait\"}";

/// Instructions for constructing the JSON of `kind`.
pub fn prompt_for(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Click => CLICK,
        ActionKind::LongPress => LONG_PRESS,
        ActionKind::InputText => INPUT_TEXT,
        ActionKind::FillForm => FILL_FORM,
        ActionKind::Answer => ANSWER,
        ActionKind::Status => STATUS,
        ActionKind::KeyboardEnter => KEYBOARD_ENTER,
        ActionKind::NavigateHome => NAVIGATE_HOME,
        ActionKind::NavigateBack => NAVIGATE_BACK,
        ActionKind::Scroll => SCROLL,
        ActionKind::OpenApp => OPEN_APP,
        ActionKind::Wait => WAIT,
    }
}
