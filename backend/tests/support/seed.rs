//! Row builders shared by the Diesel suites.

use faultline::domain::ports::{ApiKeyRepository, NewUser, ProjectRepository, UserRepository};
use faultline::domain::{
    ApiKey, ApiKeySecret, ErrorGroupId, NewApiKey, NewProject, Owned, PasswordHash, Project,
    ProjectName, ProjectUid, User, UserId, Username,
};
use faultline::outbound::persistence::{
    DieselApiKeyRepository, DieselProjectRepository, DieselUserRepository,
};

use super::{PgContext, format_postgres_error};

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        id: UserId::random(),
        username: Username::new(username).expect("valid username"),
        password_hash: PasswordHash::new(format!("hash:{username}")),
    }
}

pub fn new_project(owner: &User, name: &str) -> NewProject {
    NewProject {
        uid: ProjectUid::random(),
        name: ProjectName::new(name).expect("valid project name"),
        owner: *owner.id(),
    }
}

pub fn seed_user(ctx: &PgContext, username: &str) -> User {
    let users = DieselUserRepository::new(ctx.pool.clone());
    ctx.block_on(users.create(&new_user(username)))
        .expect("user stored")
}

pub fn seed_project(ctx: &PgContext, owner: &User, name: &str) -> Project {
    let projects = DieselProjectRepository::new(ctx.pool.clone());
    ctx.block_on(projects.create(&new_project(owner, name)))
        .expect("project stored")
}

pub fn seed_key(ctx: &PgContext, project: &Project) -> ApiKey {
    let keys = DieselApiKeyRepository::new(ctx.pool.clone());
    ctx.block_on(keys.create(&NewApiKey {
        secret: ApiKeySecret::random(),
        project_id: project.id(),
        owner: *project.owner(),
    }))
    .expect("key stored")
}

pub fn seed_error_group(ctx: &PgContext) -> ErrorGroupId {
    let id: i64 = ctx
        .client()
        .query_one("INSERT INTO error_groups DEFAULT VALUES RETURNING id", &[])
        .unwrap_or_else(|err| panic!("insert group: {}", format_postgres_error(&err)))
        .get(0);
    ErrorGroupId::new(id)
}
