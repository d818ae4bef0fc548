use std::io::Write;

use clap::{Args, Subcommand};
use vitrine::{
    listing::{DEFAULT_MAX_PRICE, ListingFilter, PriceRange, SortDirective},
    watches::{Gender, WatchId},
};
use vitrine_app::context::Storefront;

use crate::cli::render;

#[derive(Debug, Args)]
pub(crate) struct WatchesCommand {
    #[command(subcommand)]
    command: WatchesSubcommand,
}

#[derive(Debug, Subcommand)]
enum WatchesSubcommand {
    /// List the catalog with search, filters and sorting
    List(ListArgs),

    /// Show one watch
    Show(ShowArgs),

    /// List featured watches
    Featured,

    /// Search on the backend
    Search(SearchArgs),
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Match name, brand or model number (case-insensitive)
    #[arg(long, default_value = "")]
    search: String,

    /// Lowest price, inclusive
    #[arg(long, default_value_t = 0)]
    min_price: u64,

    /// Highest price, inclusive
    #[arg(long, default_value_t = DEFAULT_MAX_PRICE)]
    max_price: u64,

    /// Gender to include; repeat to include several
    #[arg(long = "gender")]
    genders: Vec<String>,

    /// Brand to include; repeat to include several
    #[arg(long = "brand")]
    brands: Vec<String>,

    /// Sort order (none, asc, desc)
    #[arg(long, default_value_t = SortDirective::Unsorted)]
    sort: SortDirective,
}

impl ListArgs {
    fn filter(self) -> ListingFilter {
        let mut filter = ListingFilter {
            search: self.search,
            price: PriceRange::new(self.min_price, self.max_price),
            sort: self.sort,
            ..ListingFilter::default()
        };

        for gender in self.genders {
            filter.genders.insert(Gender::from(gender));
        }

        filter.brands.extend(self.brands);

        filter
    }
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Watch ID
    id: WatchId,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Search term
    term: String,
}

pub(crate) async fn run(
    storefront: &Storefront,
    command: WatchesCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        WatchesSubcommand::List(args) => {
            let listing = storefront.listing().await;
            let filter = args.filter();

            render::write_listing(&listing.view(&filter), &listing.facets(), out)
        }
        WatchesSubcommand::Show(args) => {
            let watch = storefront
                .watch_detail(args.id)
                .await
                .map_err(|error| error.to_string())?;

            render::write_detail(&watch, storefront.images(), out)
        }
        WatchesSubcommand::Featured => {
            let listing = storefront.listing().await;

            render::write_watches(listing.featured(), out)
        }
        WatchesSubcommand::Search(args) => {
            let results = storefront
                .catalog()
                .search_watches(&args.term)
                .await
                .map_err(|error| format!("search failed: {error}"))?;

            render::write_watches(results.iter(), out)
        }
    }
}
