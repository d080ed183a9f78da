//! Built-in handlers and the onboarding conversation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hearken::{
    Answer, BotError, Button, Context, Continuation, Conversation, Dispatcher, HandlerResult, Question,
};

/// Register the default handlers
pub fn register(dispatcher: &mut Dispatcher) -> Result<(), BotError> {
    dispatcher.hears("help", |bot, _| {
        bot.respond("Try: hi {name}, start, help")
    })?;

    dispatcher.hears("hi {name}", |bot, args| {
        let name = args.first().map(String::as_str).unwrap_or("there");
        bot.respond(format!("Hello {}!", name))
    })?;

    dispatcher.hears("start", |bot, _| {
        bot.start_conversation(Onboarding::default())
    })?;

    dispatcher
        .register_step::<Onboarding, _>("ask_mood", Onboarding::ask_mood)
        .register_step::<Onboarding, _>("finish", Onboarding::finish);

    Ok(())
}

/// Asks for the user's name, then how they are doing
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Onboarding {
    name: Option<String>,
}

impl Conversation for Onboarding {
    const KIND: &'static str = "onboarding";

    fn run(&mut self, bot: &mut Context<'_>) -> HandlerResult {
        bot.respond("Hello! What is your name?")?;
        bot.store_conversation(self, Continuation::new("ask_mood"))
    }
}

impl Onboarding {
    fn ask_mood(&mut self, bot: &mut Context<'_>, answer: Answer, _args: &[Value]) -> HandlerResult {
        let name = answer.text().trim();
        if name.is_empty() {
            bot.respond("Sorry, I didn't catch that. What is your name?")?;
            return bot.store_conversation(self, Continuation::new("ask_mood"));
        }

        self.name = Some(name.to_string());
        let question = Question::new(format!("Nice to meet you, {}. How are you doing?", name))
            .with_callback_id("onboarding_mood")
            .with_button(Button::new("Great").with_value("great"))
            .with_button(Button::new("Not so good").with_value("bad"));
        bot.respond(question)?;
        bot.store_conversation(self, Continuation::new("finish").with_arg(name))
    }

    fn finish(&mut self, bot: &mut Context<'_>, answer: Answer, args: &[Value]) -> HandlerResult {
        let name = self
            .name
            .as_deref()
            .or_else(|| args.first().and_then(Value::as_str))
            .unwrap_or("friend");
        let reply = match answer.value() {
            Some("great") => format!("Glad to hear it, {}!", name),
            Some(_) => format!("Sorry to hear that, {}.", name),
            None => format!("Thanks for sharing, {}.", name),
        };
        bot.respond(reply)
    }
}
