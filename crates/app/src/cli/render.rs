use std::io::Write;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use vitrine::{
    images::{Gallery, SharedImageHandles},
    listing::{Facets, ListingView},
    pricing::format_price,
    watches::Watch,
};

pub(crate) fn write_watches<'a>(
    watches: impl IntoIterator<Item = &'a Watch>,
    out: &mut impl Write,
) -> Result<(), String> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Brand", "Model", "Gender", "Price", "Featured"]);

    for watch in watches {
        builder.push_record([
            watch.id.to_string(),
            watch.name.clone(),
            watch.company.clone(),
            watch.model_number.clone(),
            watch.gender.to_string(),
            format_price(watch.price),
            if watch.is_featured { "★" } else { "" }.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(5..6), Alignment::right());

    writeln!(out, "{table}").map_err(|error| error.to_string())
}

pub(crate) fn write_listing(
    view: &ListingView<'_>,
    facets: &Facets,
    out: &mut impl Write,
) -> Result<(), String> {
    let written = match view {
        ListingView::Loading => writeln!(out, "Loading watches..."),
        ListingView::Failed => writeln!(out, "Failed to load watches"),
        ListingView::EmptyCatalog => writeln!(out, "No watches in the catalog yet"),
        ListingView::NoMatches => writeln!(out, "No watches found"),
        ListingView::Results(watches) => {
            write_watches(watches.iter().copied(), out)?;
            writeln!(out, "Showing {} watches", watches.len())
        }
    };

    written.map_err(|error| error.to_string())?;

    writeln!(
        out,
        "Brands: {}\nPrice range: {} to {}",
        facets.brands.join(", "),
        format_price(0),
        format_price(facets.max_price)
    )
    .map_err(|error| error.to_string())
}

pub(crate) fn write_detail(
    watch: &Watch,
    images: &SharedImageHandles,
    out: &mut impl Write,
) -> Result<(), String> {
    writeln!(
        out,
        "{} by {} ({})\n{}\nGender: {}\nPrice: {}\n",
        watch.name,
        watch.company,
        watch.model_number,
        watch.description,
        watch.gender,
        format_price(watch.price)
    )
    .map_err(|error| error.to_string())?;

    let mut gallery = Gallery::new(&watch.images);

    for _ in 0..gallery.len() {
        let Some(bytes) = gallery.current() else {
            break;
        };

        let lease = images.lease(bytes);
        let content_type = images
            .content_type(lease.handle().as_str())
            .unwrap_or_default();

        writeln!(
            out,
            "Image {}/{}: {} ({content_type}, {} bytes)",
            gallery.index() + 1,
            gallery.len(),
            lease.handle(),
            bytes.len()
        )
        .map_err(|error| error.to_string())?;

        gallery.show_next();
    }

    Ok(())
}
