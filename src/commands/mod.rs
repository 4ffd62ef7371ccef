use std::sync::Arc;

use colored::Colorize;

use crate::nutrition::Resolver;
use crate::providers::traits::AdviceProvider;

pub mod food_cmd;

pub struct CommandHandler {
    resolver: Arc<Resolver>,
    advisor: Option<Arc<dyn AdviceProvider>>,
}

impl CommandHandler {
    pub fn new(resolver: Arc<Resolver>, advisor: Option<Arc<dyn AdviceProvider>>) -> Self {
        Self { resolver, advisor }
    }

    pub async fn handle_command(&self, input: &str) -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        // Handle single-word commands first
        match input.to_lowercase().as_str() {
            "help" => {
                self.print_help();
                return Ok(());
            }
            "exit" | "quit" => std::process::exit(0),
            _ => {}
        }

        if input.starts_with("nutrition ") {
            return food_cmd::handle_command(input, &self.resolver, self.advisor.as_deref()).await;
        }

        // Anything else is tried as a food name, then answered as chat.
        food_cmd::handle_query(input, &self.resolver, self.advisor.as_deref()).await
    }

    fn print_help(&self) {
        println!("{}", "Available commands:".bold());
        println!("- nutrition <food_item> (Get nutrition facts)");
        println!("- <anything else> (Tried as a food name first, then answered as chat)");
        println!("- help");
        println!("- exit | quit");
    }
}
