mod package_handler;

pub use package_handler::{
    create_package, delete_package, edit_package_form, list_packages, new_package_form,
    show_package, update_package, PackageState,
};
