use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::router::MenuAction;

pub(crate) fn reply_keyboard(labels: &[String]) -> KeyboardMarkup {
    let keyboard = labels
        .iter()
        .map(|label| vec![KeyboardButton::new(label)]);

    KeyboardMarkup::new(keyboard).resize_keyboard()
}

fn labels(actions: &[MenuAction]) -> Vec<String> {
    actions.iter().map(|action| action.label().to_owned()).collect()
}

pub fn result_menu() -> Vec<String> {
    labels(&MenuAction::ALL)
}

pub fn back_menu() -> Vec<String> {
    labels(&[
        MenuAction::Share,
        MenuAction::CareInfo,
        MenuAction::ContactStaff,
        MenuAction::LeaveFeedback,
    ])
}

pub fn feedback_menu() -> Vec<String> {
    labels(&[
        MenuAction::Share,
        MenuAction::CareInfo,
        MenuAction::ContactStaff,
        MenuAction::LeaveFeedback,
        MenuAction::Restart,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_button_per_row() {
        let markup = reply_keyboard(&["Рыбу".to_owned(), "Стейк".to_owned()]);
        assert_eq!(markup.keyboard.len(), 2);
        assert!(markup.keyboard.iter().all(|row| row.len() == 1));
        assert_eq!(markup.keyboard[1][0].text, "Стейк");
    }

    #[test]
    fn menu_variants() {
        let restart = MenuAction::Restart.label().to_owned();
        let back = MenuAction::Back.label().to_owned();

        let result = result_menu();
        assert_eq!(result.len(), 6);
        assert_eq!(result.last(), Some(&back));

        assert!(!back_menu().contains(&restart));
        assert!(!back_menu().contains(&back));

        assert_eq!(feedback_menu().last(), Some(&restart));
        assert!(!feedback_menu().contains(&back));
    }
}
