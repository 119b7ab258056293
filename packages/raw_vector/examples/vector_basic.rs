//! Demonstrates the basic operations of `Vector` and how its capacity evolves.

use raw_vector::Vector;

fn main() {
    println!("=== Vector Basic Example ===");

    let mut names = Vector::new();

    for name in ["alpha", "bravo", "delta", "echo"] {
        names.push_back(name.to_string());
        println!(
            "  Pushed {name:<6} -> length {}, capacity {}",
            names.len(),
            names.capacity()
        );
    }

    // Insert into the middle. The vector is full, so this reallocates.
    names.emplace(2, || "charlie".to_string());
    println!(
        "After emplace: {names:?} (capacity {})",
        names.capacity()
    );

    // Erasing does not release capacity.
    let next = names.erase(0);
    println!(
        "After erase: {names:?}, element now at erased position: {}",
        names[next]
    );

    // Copies are independent of the original.
    let mut copy = names.clone();
    copy.back_mut().push_str("-copy");
    println!("Original: {names:?}");
    println!("Copy:     {copy:?} (capacity {})", copy.capacity());

    // Resizing fills new slots with default values.
    copy.resize(6);
    println!("Resized copy: {copy:?}");

    println!("Vector example completed successfully!");
}
