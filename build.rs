fn main() {
    // ESP-IDF environment (linker args, sdkconfig) only matters for the
    // firmware image; host builds and tests skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
