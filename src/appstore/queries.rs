//! GraphQL documents sent to the app-store service

pub const GET_APP_STORE_LISTING: &str = r#"
  query GetAppStoreListing($id: ID!) {
    app(id: $id) {
      name
      description
      authorDisplay
      image
      ... on AppStoreWebApplication {
        url
      }
    }
  }
"#;

pub const CREATE_APP_STORE_LISTING: &str = r#"
  mutation CreateAppStoreListing($input: CreateWebAppInput!) {
    createWebApp(input: $input) {
      id
    }
  }
"#;

pub const EDIT_APP_STORE_LISTING: &str = r#"
  mutation EditAppStoreListing($id: ID!, $edits: EditWebAppInput!) {
    editWebApp(id: $id, edits: $edits)
  }
"#;

pub const DELETE_APP_STORE_LISTING: &str = r#"
  mutation DeleteAppStoreListing($id: ID!) {
    deleteWebApp(id: $id)
  }
"#;
