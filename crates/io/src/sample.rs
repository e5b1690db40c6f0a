// Synthetic sample dataset (books)

use rand::Rng;

use rowdeck_engine::row::{Column, Row, RowId, Schema};

pub const DEFAULT_SAMPLE_ROWS: usize = 10_000;

const AUTHORS: [&str; 10] = [
    "John Smith",
    "Emily Johnson",
    "Michael Brown",
    "Sarah Davis",
    "David Wilson",
    "Lisa Anderson",
    "Robert Taylor",
    "Jennifer Martinez",
    "William Garcia",
    "Maria Rodriguez",
];

const GENRES: [&str; 10] = [
    "Fiction",
    "Non-Fiction",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Fantasy",
    "Biography",
    "History",
    "Self-Help",
    "Poetry",
];

/// Fixed column order for the generated dataset. PublishedYear sorts
/// numerically.
pub fn schema() -> Schema {
    Schema::new(vec![
        Column::text("Title"),
        Column::text("Author"),
        Column::text("Genre"),
        Column::numeric("PublishedYear"),
        Column::text("ISBN"),
    ])
}

/// Generate `count` book rows with ids 1..=count.
pub fn generate(count: usize) -> Vec<Row> {
    generate_with_rng(count, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng>(count: usize, rng: &mut R) -> Vec<Row> {
    (1..=count)
        .map(|i| {
            let author = AUTHORS[rng.gen_range(0..AUTHORS.len())];
            let genre = GENRES[rng.gen_range(0..GENRES.len())];
            let year: i64 = rng.gen_range(1900..2024);
            let isbn: u64 = rng.gen_range(1_000_000_000..10_000_000_000);
            Row::with_fields(
                RowId(i as u64),
                [
                    ("Title".to_string(), format!("Book Title {}", i)),
                    ("Author".to_string(), author.to_string()),
                    ("Genre".to_string(), genre.to_string()),
                    ("PublishedYear".to_string(), year.to_string()),
                    ("ISBN".to_string(), format!("978-{}", isbn)),
                ],
            )
        })
        .collect()
}
