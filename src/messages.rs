//! User-facing texts.

pub const CHOOSE_ACTION: &str = "Выберите одно из действий:";
pub const CHOOSE_ACTION_SHORT: &str = "Выберите действие:";
pub const RESTART: &str = "Давайте попробуем ещё раз! Начнём заново.";
pub const FEEDBACK_PROMPT: &str = "Пожалуйста, напишите ваш отзыв:";
pub const FEEDBACK_THANKS: &str = "Спасибо за ваш отзыв! Мы обязательно его учтем.";
pub const NO_RESULTS: &str = "Ошибка: ваши результаты не найдены. Пожалуйста, пройдите викторину.";
pub const CARE_INFO: &str = "Программа опеки зоопарка — это отличный способ поддержать животных. \
Узнайте, как можно стать опекуном и помочь нашим друзьям по ссылке: https://moscowzoo.ru/about/guardianship!";
pub const STAFF_EMAIL: &str = "partnershipzoo@culture.mos.ru";
pub const BOT_HANDLE: &str = "@ZooQuiz";

pub fn greeting(first_name: &str) -> String {
    format!(
        "Привет, {first_name}! Давай выясним, какое ты животное в Московском зоопарке! Отвечай на вопросы:"
    )
}

pub fn result_caption(category: &str) -> String {
    format!("Твоё тотемное животное — {category}!")
}

pub fn share(category: &str, link: &str) -> String {
    format!(
        "Скопируйте и поделитесь этим сообщением:\n\n\
         Я прошел викторину в {BOT_HANDLE} и узнал, что моё тотемное животное — {category}! \
         Присоединяйтесь и узнайте, какое животное подойдёт вам!\n\n\
         Ссылка на бота: {link}"
    )
}

pub fn contact_staff(category: &str) -> String {
    format!(
        "Вы прошли викторину! Ваше тотемное животное — {category}.\n\
         Чтобы узнать больше о программе опекунства, Вы можете связаться с нашим сотрудником по адресу: {STAFF_EMAIL}"
    )
}

pub fn forwarded_feedback(full_name: &str, feedback: &str) -> String {
    format!("Пользователь {full_name} оставил отзыв:\n\n{feedback}")
}
