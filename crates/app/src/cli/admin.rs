use std::{fs, io::Write, path::PathBuf};

use clap::{Args, Subcommand};
use vitrine::{
    drafts::{DraftError, WatchDraft},
    watches::{Gender, WatchId},
};
use vitrine_app::context::Storefront;
use zeroize::Zeroizing;

#[derive(Debug, Args)]
pub(crate) struct AdminCommand {
    /// Admin password
    #[arg(long, env = "VITRINE_ADMIN_LOGIN", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminSubcommand {
    /// Add a watch
    Add(AddArgs),

    /// Update a watch; omitted fields keep their current value
    Update(UpdateArgs),

    /// Delete a watch
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Watch name
    #[arg(long)]
    name: String,

    /// Brand
    #[arg(long)]
    company: String,

    /// Model number
    #[arg(long)]
    model_number: String,

    /// Price in whole dollars
    #[arg(long)]
    price: String,

    /// Gender (Men, Women, Unisex)
    #[arg(long, default_value = "Men")]
    gender: String,

    /// Description
    #[arg(long)]
    description: String,

    /// Show in the featured section
    #[arg(long)]
    featured: bool,

    /// Image files, main image first (1 to 5)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Watch ID
    id: WatchId,

    /// Watch name
    #[arg(long)]
    name: Option<String>,

    /// Brand
    #[arg(long)]
    company: Option<String>,

    /// Model number
    #[arg(long)]
    model_number: Option<String>,

    /// Price in whole dollars
    #[arg(long)]
    price: Option<String>,

    /// Gender (Men, Women, Unisex)
    #[arg(long)]
    gender: Option<String>,

    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Featured flag
    #[arg(long)]
    featured: Option<bool>,

    /// Remove the existing image at this position (from 1); repeatable
    #[arg(long = "remove-image")]
    remove_images: Vec<usize>,

    /// Image files to append
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Watch ID
    id: WatchId,
}

pub(crate) async fn run(
    storefront: &Storefront,
    command: AdminCommand,
    out: &mut impl Write,
) -> Result<(), String> {
    let password = Zeroizing::new(command.password);

    storefront
        .login(&password)
        .map_err(|error| error.to_string())?;

    match command.command {
        AdminSubcommand::Add(args) => {
            let mut draft = WatchDraft::new();
            draft.name = args.name;
            draft.company = args.company;
            draft.model_number = args.model_number;
            draft.price = args.price;
            draft.gender = Gender::from(args.gender);
            draft.description = args.description;
            draft.is_featured = args.featured;

            attach_images(storefront, &mut draft, &args.images)?;

            let id = storefront
                .add_watch(&draft)
                .await
                .map_err(|error| error.to_string())?;

            writeln!(out, "{id}").map_err(|error| error.to_string())
        }
        AdminSubcommand::Update(args) => {
            let watch = storefront
                .watch_detail(args.id)
                .await
                .map_err(|error| error.to_string())?;

            let mut draft = WatchDraft::from_watch(&watch);

            if let Some(name) = args.name {
                draft.name = name;
            }
            if let Some(company) = args.company {
                draft.company = company;
            }
            if let Some(model_number) = args.model_number {
                draft.model_number = model_number;
            }
            if let Some(price) = args.price {
                draft.price = price;
            }
            if let Some(gender) = args.gender {
                draft.gender = Gender::from(gender);
            }
            if let Some(description) = args.description {
                draft.description = description;
            }
            if let Some(featured) = args.featured {
                draft.is_featured = featured;
            }

            let mut positions = args.remove_images;
            positions.sort_unstable_by(|left, right| right.cmp(left));
            positions.dedup();

            for position in positions {
                draft.remove_image(position.saturating_sub(1));
            }

            attach_images(storefront, &mut draft, &args.images)?;

            storefront
                .update_watch(args.id, &draft)
                .await
                .map_err(|error| error.to_string())
        }
        AdminSubcommand::Delete(args) => storefront
            .delete_watch(args.id)
            .await
            .map_err(|error| error.to_string()),
    }
}

fn attach_images(
    storefront: &Storefront,
    draft: &mut WatchDraft,
    paths: &[PathBuf],
) -> Result<(), String> {
    let images = paths
        .iter()
        .map(|path| {
            fs::read(path).map_err(|error| format!("failed to read {}: {error}", path.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let added = draft.add_images(images);

    if added.overflowed() {
        storefront
            .notifier()
            .error(&DraftError::TooManyImages.to_string());
    }

    Ok(())
}
