use std::io::{self, BufRead, Write};

use anyhow::Context;
use storefront_core::config::LoadOptions;
use storefront_core::{ApplicationError, OrderItem, ProductId, Store};

use super::{load_store, CommandResult};

const MENU: &str = "\n   Store Menu\n   ----------\n1. List all products in store\n\
2. Show total amount in store\n3. Make an order\n4. Quit";

pub fn run(options: LoadOptions) -> CommandResult {
    let mut context = match load_store(options) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error("shop", &error),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let currency = context.config.store.currency.clone();
    match run_session(&mut context.store, &currency, stdin.lock(), stdout.lock()) {
        Ok(()) => CommandResult::success("shop", "session closed"),
        Err(error) => CommandResult::failure("shop", "io", format!("{error:#}"), 1),
    }
}

/// Drives the menu loop until the user quits or the input is exhausted.
pub fn run_session<R: BufRead, W: Write>(
    store: &mut Store,
    currency: &str,
    mut input: R,
    mut output: W,
) -> anyhow::Result<()> {
    loop {
        writeln!(output, "{MENU}").context("writing menu")?;
        let Some(choice) = prompt(&mut input, &mut output, "Please choose a number: ")? else {
            return Ok(());
        };

        match choice.parse::<u8>() {
            Ok(1) => list_products(store, &mut output)?,
            Ok(2) => {
                writeln!(output, "Total of {} items in store", store.total_quantity())?;
            }
            Ok(3) => make_order(store, currency, &mut input, &mut output)?,
            Ok(4) => return Ok(()),
            Ok(_) => {}
            Err(_) => writeln!(output, "Error with your choice! Try again!")?,
        }
        writeln!(output)?;
    }
}

fn list_products<W: Write>(store: &Store, output: &mut W) -> anyhow::Result<()> {
    writeln!(output, "------")?;
    for (index, product) in store.all_products().into_iter().enumerate() {
        writeln!(output, "{}. {product}", index + 1)?;
    }
    writeln!(output, "------")?;
    Ok(())
}

fn make_order<R: BufRead, W: Write>(
    store: &mut Store,
    currency: &str,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()> {
    list_products(store, output)?;
    writeln!(output, "When you want to finish order, enter empty text.")?;

    let listing: Vec<ProductId> =
        store.all_products().into_iter().map(|product| product.id().clone()).collect();
    let mut shopping_list = Vec::new();

    loop {
        let Some(position) = prompt(input, output, "Which product # do you want? ")? else {
            return Ok(());
        };
        if position.is_empty() {
            break;
        }
        let Some(amount) = prompt(input, output, "What amount do you want? ")? else {
            return Ok(());
        };
        if amount.is_empty() {
            break;
        }

        match resolve_line(&listing, &position, &amount) {
            Some(item) => {
                shopping_list.push(item);
                writeln!(output, "Product added to list!\n")?;
            }
            None => writeln!(output, "Error adding product!\n")?,
        }
    }

    if shopping_list.is_empty() {
        return Ok(());
    }

    match store.order(shopping_list) {
        Ok(total) if total.is_zero() => {}
        Ok(total) => {
            writeln!(output, "********\nOrder made! Total payment: {total} {currency}")?;
        }
        Err(error) => {
            let error = ApplicationError::from(error);
            tracing::warn!(
                event_name = "cli.shop.order_rejected",
                error_class = error.error_class(),
                error = %error,
                "order rejected"
            );
            writeln!(output, "{}", error.user_message())?;
        }
    }
    Ok(())
}

fn resolve_line(listing: &[ProductId], position: &str, amount: &str) -> Option<OrderItem> {
    let position = position.parse::<usize>().ok()?.checked_sub(1)?;
    let quantity = amount.parse::<u32>().ok()?;
    let product_id = listing.get(position)?;
    Some(OrderItem::new(product_id.clone(), quantity))
}

/// Prints `text` and reads one trimmed line; `None` once input is exhausted.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> anyhow::Result<Option<String>> {
    write!(output, "{text}").context("writing prompt")?;
    output.flush().context("flushing prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("reading input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
