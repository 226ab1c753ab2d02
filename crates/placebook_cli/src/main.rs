//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `placebook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use placebook_core::CategoryMap;

fn main() {
    println!("placebook_core ping={}", placebook_core::ping());
    println!("placebook_core version={}", placebook_core::core_version());

    let categories = CategoryMap::standard();
    for name in categories.categories() {
        println!(
            "category name={} icon={}",
            name,
            categories.category_icon(name).unwrap_or("none")
        );
    }
}
