use std::env;

use recipefy::{CanonicalRecipe, Error, GenerationOutcome, Recipefy, RecipeId};

const USAGE: &str = "Usage: recipefy <search <keyword> [meal-type] | popular | show <id> | generate <request> | favorites | save <id>>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).ok_or(USAGE)?;

    let service = Recipefy::builder().build()?;

    match command {
        "search" => {
            let keyword = args.get(2).ok_or("Please provide a search keyword")?;
            let meal_type = args.get(3).map(String::as_str);
            let recipes = service.search(keyword, meal_type, 0, 10).await?;
            print_list(&recipes);
        }
        "popular" => {
            let recipes = service.popular(0, 10).await?;
            print_list(&recipes);
        }
        "show" => {
            let id = parse_id(args.get(2))?;
            match service.recipe_by_id(id).await {
                Ok(Some(recipe)) => print_recipe(&recipe),
                Ok(None) | Err(Error::MalformedRecipe(_)) => println!("Recipe not found."),
                Err(e) => return Err(e.into()),
            }
        }
        "generate" => {
            let request = args[2..].join(" ");
            if request.trim().is_empty() {
                return Err("Please describe the recipe you want".into());
            }
            match service.generate(&request).await? {
                GenerationOutcome::Recipe(recipe) => print_recipe(&recipe),
                GenerationOutcome::Refused(reply) => println!("{}", reply),
            }
        }
        "favorites" => {
            service.sign_in().await?;
            let recipes = service.favorites().await?;
            if recipes.is_empty() {
                println!("You haven't saved any recipes yet.");
            } else {
                print_list(&recipes);
            }
        }
        "save" => {
            service.sign_in().await?;
            let id = parse_id(args.get(2))?;
            let recipe = service
                .recipe_by_id(id)
                .await?
                .ok_or("Recipe not found")?;
            if service.toggle_save(&recipe).await? {
                println!("Saved \"{}\".", recipe.title);
            } else {
                println!("Removed \"{}\" from favorites.", recipe.title);
            }
        }
        _ => return Err(USAGE.into()),
    }

    Ok(())
}

fn parse_id(arg: Option<&String>) -> Result<RecipeId, Box<dyn std::error::Error>> {
    let raw = arg.ok_or("Please provide a recipe id")?;
    let id = raw
        .parse::<u64>()
        .map_err(|_| format!("Not a recipe id: {}", raw))?;
    Ok(RecipeId(id))
}

fn print_list(recipes: &[CanonicalRecipe]) {
    for recipe in recipes {
        println!(
            "{:>13}  {} ({} min, serves {})",
            recipe.id, recipe.title, recipe.ready_in_minutes, recipe.servings
        );
    }
}

fn print_recipe(recipe: &CanonicalRecipe) {
    println!("{}", recipe.title);
    println!(
        "Ready in {} minutes, serves {}",
        recipe.ready_in_minutes, recipe.servings
    );

    println!("\nIngredients:");
    for line in &recipe.ingredients {
        println!("  - {}", line);
    }

    println!("\nInstructions:");
    for group in &recipe.instruction_groups {
        if let Some(name) = &group.name {
            println!("  {}:", name);
        }
        for step in &group.steps {
            println!("  {}. {}", step.number, step.text);
        }
    }
}
