use std::io::Write;

use clap::{Args, Subcommand};
use vitrine::{cart::Quantity, watches::WatchId};
use vitrine_app::context::Storefront;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show cart lines and total
    Show,

    /// Add a watch to the cart
    Add(AddArgs),

    /// Remove a watch from the cart
    Remove(WatchArgs),

    /// Change the quantity of a cart line
    Update(UpdateArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Watch ID
    id: WatchId,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u64,
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Watch ID
    id: WatchId,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Watch ID
    id: WatchId,

    /// New quantity, at least 1
    quantity: u64,
}

pub(crate) async fn run(
    storefront: &Storefront,
    command: CartCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => {
            let page = storefront
                .cart_page()
                .await
                .map_err(|error| format!("failed to load cart: {error}"))?;

            writeln!(out, "Cart for {}", storefront.user()).map_err(|error| error.to_string())?;

            page.summary()
                .write_to(out)
                .map_err(|error| error.to_string())
        }
        CartSubcommand::Add(args) => {
            let quantity = Quantity::new(args.quantity).map_err(|error| error.to_string())?;
            let watch = storefront
                .watch_detail(args.id)
                .await
                .map_err(|error| error.to_string())?;

            storefront
                .add_units_to_cart(&watch, quantity)
                .await
                .map_err(|error| error.to_string())
        }
        CartSubcommand::Remove(args) => storefront
            .remove_from_cart(args.id)
            .await
            .map_err(|error| error.to_string()),
        CartSubcommand::Update(args) => storefront
            .update_quantity(args.id, args.quantity)
            .await
            .map_err(|error| error.to_string()),
        CartSubcommand::Clear => storefront
            .cart()
            .clear_cart()
            .await
            .map_err(|error| format!("failed to clear cart: {error}")),
    }
}
