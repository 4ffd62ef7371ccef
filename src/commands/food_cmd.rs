use colored::Colorize;

use crate::nutrition::{Query, Resolver};
use crate::providers::traits::AdviceProvider;
use crate::reply;

pub async fn handle_command(
    input: &str,
    resolver: &Resolver,
    advisor: Option<&dyn AdviceProvider>,
) -> Result<(), String> {
    let food_item = input.trim_start_matches("nutrition").trim();
    if food_item.is_empty() {
        println!("Please specify a food item to analyze.");
        return Ok(());
    }

    match resolver.resolve(Query::Text(food_item.to_string())).await {
        Some(record) => println!("{}", reply::nutrition_reply(&record, advisor).await),
        None => println!("{}", reply::UNRESOLVED_REPLY.yellow()),
    }
    Ok(())
}

pub async fn handle_query(
    input: &str,
    resolver: &Resolver,
    advisor: Option<&dyn AdviceProvider>,
) -> Result<(), String> {
    match resolver.resolve(Query::Text(input.to_string())).await {
        Some(record) => println!("{}", reply::nutrition_reply(&record, advisor).await),
        None => println!("{}", reply::chat_reply(input, advisor).await),
    }
    Ok(())
}
