//! Translations for the user interface.
//!
//! Portuguese is the default language. A key that is missing from a
//! language's table falls back to the Portuguese text, and a key that is
//! missing from every table is shown as-is.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A language the user interface can be displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Portuguese.
    #[default]
    Pt,
    /// English.
    En,
    /// Spanish.
    Es,
}

impl Language {
    /// Every supported language, in the order they are offered to the user.
    pub const ALL: [Language; 3] = [Language::Pt, Language::En, Language::Es];

    /// The code used in URLs, forms and storage, e.g. "pt".
    pub fn code(self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// The name of the language in that language.
    pub fn label(self) -> &'static str {
        match self {
            Language::Pt => "Português",
            Language::En => "English",
            Language::Es => "Español",
        }
    }

    /// Get the text for `key`.
    ///
    /// Falls back to Portuguese and then to `key` itself.
    pub fn translate<'a>(self, key: &'a str) -> &'a str {
        lookup(self, key)
            .or_else(|| lookup(Language::Pt, key))
            .unwrap_or(key)
    }

    /// Get the text for `key` with each `{name}` placeholder replaced by the
    /// matching value in `params`.
    pub fn translate_with(self, key: &str, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .fold(self.translate(key).to_owned(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pt" => Ok(Language::Pt),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(format!("unsupported language \"{other}\"")),
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    let table = match language {
        Language::Pt => PT,
        Language::En => EN,
        Language::Es => ES,
    };

    table
        .iter()
        .find(|(table_key, _)| *table_key == key)
        .map(|(_, text)| *text)
}

type Table = &'static [(&'static str, &'static str)];

const PT: Table = &[
    ("app_name", "Meu Inventário"),
    ("welcome", "Bem-vinda!"),
    ("login_subtitle", "Entre para ver o seu inventário de maquiagem"),
    ("email", "E-mail"),
    ("password", "Senha"),
    ("confirm_password", "Confirmar senha"),
    ("login", "Entrar"),
    ("remember_me", "Manter sessão por uma semana"),
    ("create_account", "Criar conta"),
    ("register_title", "Crie a sua conta"),
    ("have_account", "Já tem uma conta?"),
    ("no_account", "Ainda não tem uma conta?"),
    ("error_invalid", "E-mail ou senha inválidos."),
    (
        "error_pending",
        "Conta aguardando aprovação do administrador.",
    ),
    ("error_in_use", "Este e-mail já está em uso."),
    ("error_fill_all", "Preencha todos os campos."),
    ("error_password_mismatch", "As senhas não coincidem."),
    ("error_invalid_email", "Informe um e-mail válido."),
    ("error_weak_password", "Senha muito fraca."),
    (
        "demo_mode",
        "Modo demonstração: os dados ficam guardados apenas neste servidor.",
    ),
    ("inventory", "Inventário"),
    ("items_count", "{count} itens"),
    ("new_category", "Nova categoria"),
    ("edit_category", "Editar categoria"),
    ("category_name", "Nome da categoria"),
    ("save", "Salvar"),
    ("cancel", "Cancelar"),
    ("delete", "Excluir"),
    ("delete_cat_title", "Excluir categoria"),
    (
        "delete_cat_msg",
        "Excluir \"{name}\" e todos os seus itens?",
    ),
    ("no_categories", "Nenhuma categoria ainda."),
    ("appearance", "Aparência"),
    ("theme_color", "Cor do tema"),
    ("font_style", "Estilo da fonte"),
    ("language", "Idioma"),
    ("done", "Concluído"),
    ("back", "Voltar"),
    ("details", "Detalhes"),
    ("edit", "Editar"),
    ("no_image", "Sem imagem"),
    ("notes", "Notas"),
    ("date_added", "Adicionado em"),
    ("delete_item_title", "Excluir item"),
    ("delete_item_msg", "Excluir \"{name}\"?"),
    ("edit_item", "Editar item"),
    ("add_item", "Adicionar item"),
    ("no_items", "Nenhum item encontrado."),
    ("title", "Título"),
    ("type", "Tipo"),
    ("brand", "Marca"),
    ("color", "Cor"),
    ("images", "Imagens"),
    ("photo", "Foto"),
    ("remove_photo", "Remover foto"),
    ("search", "Pesquisar..."),
    ("filter", "Filtrar"),
    ("sort", "Ordenar"),
    ("sort_date_desc", "Mais recentes"),
    ("sort_date_asc", "Mais antigos"),
    ("sort_az", "A-Z"),
    ("sort_za", "Z-A"),
    ("filter_by_brand", "Filtrar por marca"),
    ("filter_by_color", "Filtrar por cor"),
    ("apply", "Aplicar"),
    ("users_title", "Usuários"),
    ("no_users", "Nenhum usuário."),
    ("delete_user_title", "Excluir usuário"),
    ("delete_user_msg", "Excluir \"{name}\" e todos os seus dados?"),
    ("approve", "Aprovar"),
    ("pending_approval", "Aguardando aprovação"),
    ("active_users", "Usuários ativos"),
    ("user_deleted", "Usuário excluído."),
    ("user_approved", "Usuário aprovado."),
    (
        "cannot_delete_self",
        "Você não pode excluir a sua própria conta.",
    ),
    ("admin", "Administrador"),
    ("logout", "Sair"),
    ("advisor", "Consultora"),
    (
        "advisor_subtitle",
        "Peça dicas de maquiagem com base no seu inventário.",
    ),
    ("advisor_prompt", "O que você gostaria de saber?"),
    ("ask", "Perguntar"),
    (
        "advisor_unavailable",
        "Desculpe, não foi possível obter uma resposta agora. Tente novamente mais tarde.",
    ),
    ("theme_pink", "Rosa"),
    ("theme_blue", "Azul"),
    ("theme_mint", "Menta"),
    ("theme_lavender", "Lilás"),
    ("theme_cream", "Creme"),
    ("save_error_title", "Erro ao salvar"),
    ("save_error", "Erro ao salvar dados. Verifique o tamanho da imagem."),
    ("not_found_title", "Não encontrado"),
    ("not_found_msg", "O recurso solicitado não existe."),
    ("missing_category_title", "Categoria não encontrada"),
    (
        "missing_category_msg",
        "A categoria pode ter sido excluída. Atualize a página.",
    ),
    ("missing_item_title", "Item não encontrado"),
    (
        "missing_item_msg",
        "O item pode ter sido excluído. Atualize a página.",
    ),
    ("forbidden_title", "Acesso negado"),
    (
        "forbidden_msg",
        "Apenas administradores podem fazer isso.",
    ),
    ("invalid_form_msg", "Não foi possível ler o formulário."),
    ("generic_error_title", "Algo deu errado"),
    ("generic_error_msg", "Tente novamente mais tarde."),
];

const EN: Table = &[
    ("app_name", "My Inventory"),
    ("welcome", "Welcome!"),
    ("login_subtitle", "Sign in to see your makeup inventory"),
    ("email", "Email"),
    ("password", "Password"),
    ("confirm_password", "Confirm password"),
    ("login", "Log in"),
    ("remember_me", "Keep me logged in for one week"),
    ("create_account", "Create account"),
    ("register_title", "Create your account"),
    ("have_account", "Already have an account?"),
    ("no_account", "Don't have an account yet?"),
    ("error_invalid", "Invalid email or password."),
    ("error_pending", "Account pending administrator approval."),
    ("error_in_use", "This email is already in use."),
    ("error_fill_all", "Please fill in all fields."),
    ("error_password_mismatch", "Passwords do not match."),
    ("error_invalid_email", "Enter a valid email address."),
    ("error_weak_password", "Password is too weak."),
    (
        "demo_mode",
        "Demo mode: data is only stored on this server.",
    ),
    ("inventory", "Inventory"),
    ("items_count", "{count} items"),
    ("new_category", "New category"),
    ("edit_category", "Edit category"),
    ("category_name", "Category name"),
    ("save", "Save"),
    ("cancel", "Cancel"),
    ("delete", "Delete"),
    ("delete_cat_title", "Delete category"),
    ("delete_cat_msg", "Delete \"{name}\" and all of its items?"),
    ("no_categories", "No categories yet."),
    ("appearance", "Appearance"),
    ("theme_color", "Theme colour"),
    ("font_style", "Font style"),
    ("language", "Language"),
    ("done", "Done"),
    ("back", "Back"),
    ("details", "Details"),
    ("edit", "Edit"),
    ("no_image", "No image"),
    ("notes", "Notes"),
    ("date_added", "Added on"),
    ("delete_item_title", "Delete item"),
    ("delete_item_msg", "Delete \"{name}\"?"),
    ("edit_item", "Edit item"),
    ("add_item", "Add item"),
    ("no_items", "No items found."),
    ("title", "Title"),
    ("type", "Type"),
    ("brand", "Brand"),
    ("color", "Colour"),
    ("images", "Images"),
    ("photo", "Photo"),
    ("remove_photo", "Remove photo"),
    ("search", "Search..."),
    ("filter", "Filter"),
    ("sort", "Sort"),
    ("sort_date_desc", "Newest first"),
    ("sort_date_asc", "Oldest first"),
    ("sort_az", "A-Z"),
    ("sort_za", "Z-A"),
    ("filter_by_brand", "Filter by brand"),
    ("filter_by_color", "Filter by colour"),
    ("apply", "Apply"),
    ("users_title", "Users"),
    ("no_users", "No users."),
    ("delete_user_title", "Delete user"),
    ("delete_user_msg", "Delete \"{name}\" and all of their data?"),
    ("approve", "Approve"),
    ("pending_approval", "Pending approval"),
    ("active_users", "Active users"),
    ("user_deleted", "User deleted."),
    ("user_approved", "User approved."),
    ("cannot_delete_self", "You cannot delete your own account."),
    ("admin", "Administrator"),
    ("logout", "Log out"),
    ("advisor", "Advisor"),
    (
        "advisor_subtitle",
        "Ask for makeup tips based on your inventory.",
    ),
    ("advisor_prompt", "What would you like to know?"),
    ("ask", "Ask"),
    (
        "advisor_unavailable",
        "Sorry, I couldn't get an answer right now. Please try again later.",
    ),
    ("theme_pink", "Pink"),
    ("theme_blue", "Blue"),
    ("theme_mint", "Mint"),
    ("theme_lavender", "Lavender"),
    ("theme_cream", "Cream"),
    ("save_error_title", "Could not save"),
    ("save_error", "Error saving data. Check image size."),
    ("not_found_title", "Not found"),
    ("not_found_msg", "The requested resource does not exist."),
    ("missing_category_title", "Category not found"),
    (
        "missing_category_msg",
        "The category may have been deleted. Refresh the page.",
    ),
    ("missing_item_title", "Item not found"),
    (
        "missing_item_msg",
        "The item may have been deleted. Refresh the page.",
    ),
    ("forbidden_title", "Access denied"),
    ("forbidden_msg", "Only administrators can do that."),
    ("invalid_form_msg", "The form could not be read."),
    ("generic_error_title", "Something went wrong"),
    ("generic_error_msg", "Please try again later."),
];

const ES: Table = &[
    ("app_name", "Mi Inventario"),
    ("welcome", "¡Bienvenida!"),
    (
        "login_subtitle",
        "Inicia sesión para ver tu inventario de maquillaje",
    ),
    ("email", "Correo electrónico"),
    ("password", "Contraseña"),
    ("confirm_password", "Confirmar contraseña"),
    ("login", "Entrar"),
    ("remember_me", "Mantener la sesión durante una semana"),
    ("create_account", "Crear cuenta"),
    ("register_title", "Crea tu cuenta"),
    ("have_account", "¿Ya tienes una cuenta?"),
    ("no_account", "¿Aún no tienes una cuenta?"),
    ("error_invalid", "Correo o contraseña no válidos."),
    (
        "error_pending",
        "Cuenta pendiente de aprobación del administrador.",
    ),
    ("error_in_use", "Este correo ya está en uso."),
    ("error_fill_all", "Completa todos los campos."),
    ("error_password_mismatch", "Las contraseñas no coinciden."),
    ("error_invalid_email", "Introduce un correo válido."),
    ("error_weak_password", "La contraseña es demasiado débil."),
    (
        "demo_mode",
        "Modo demostración: los datos solo se guardan en este servidor.",
    ),
    ("inventory", "Inventario"),
    ("items_count", "{count} artículos"),
    ("new_category", "Nueva categoría"),
    ("edit_category", "Editar categoría"),
    ("category_name", "Nombre de la categoría"),
    ("save", "Guardar"),
    ("cancel", "Cancelar"),
    ("delete", "Eliminar"),
    ("delete_cat_title", "Eliminar categoría"),
    (
        "delete_cat_msg",
        "¿Eliminar \"{name}\" y todos sus artículos?",
    ),
    ("no_categories", "Todavía no hay categorías."),
    ("appearance", "Apariencia"),
    ("theme_color", "Color del tema"),
    ("font_style", "Estilo de fuente"),
    ("language", "Idioma"),
    ("done", "Listo"),
    ("back", "Volver"),
    ("details", "Detalles"),
    ("edit", "Editar"),
    ("no_image", "Sin imagen"),
    ("notes", "Notas"),
    ("date_added", "Añadido el"),
    ("delete_item_title", "Eliminar artículo"),
    ("delete_item_msg", "¿Eliminar \"{name}\"?"),
    ("edit_item", "Editar artículo"),
    ("add_item", "Añadir artículo"),
    ("no_items", "No se encontraron artículos."),
    ("title", "Título"),
    ("type", "Tipo"),
    ("brand", "Marca"),
    ("color", "Color"),
    ("images", "Imágenes"),
    ("photo", "Foto"),
    ("remove_photo", "Quitar foto"),
    ("search", "Buscar..."),
    ("filter", "Filtrar"),
    ("sort", "Ordenar"),
    ("sort_date_desc", "Más recientes"),
    ("sort_date_asc", "Más antiguos"),
    ("sort_az", "A-Z"),
    ("sort_za", "Z-A"),
    ("filter_by_brand", "Filtrar por marca"),
    ("filter_by_color", "Filtrar por color"),
    ("apply", "Aplicar"),
    ("users_title", "Usuarios"),
    ("no_users", "No hay usuarios."),
    ("delete_user_title", "Eliminar usuario"),
    ("delete_user_msg", "¿Eliminar \"{name}\" y todos sus datos?"),
    ("approve", "Aprobar"),
    ("pending_approval", "Pendiente de aprobación"),
    ("active_users", "Usuarios activos"),
    ("user_deleted", "Usuario eliminado."),
    ("user_approved", "Usuario aprobado."),
    ("cannot_delete_self", "No puedes eliminar tu propia cuenta."),
    ("admin", "Administrador"),
    ("logout", "Salir"),
    ("advisor", "Asesora"),
    (
        "advisor_subtitle",
        "Pide consejos de maquillaje basados en tu inventario.",
    ),
    ("advisor_prompt", "¿Qué te gustaría saber?"),
    ("ask", "Preguntar"),
    (
        "advisor_unavailable",
        "Lo siento, no pude obtener una respuesta ahora. Inténtalo más tarde.",
    ),
    ("theme_pink", "Rosa"),
    ("theme_blue", "Azul"),
    ("theme_mint", "Menta"),
    ("theme_lavender", "Lavanda"),
    ("theme_cream", "Crema"),
    ("save_error_title", "No se pudo guardar"),
    (
        "save_error",
        "Error al guardar los datos. Comprueba el tamaño de la imagen.",
    ),
    ("not_found_title", "No encontrado"),
    ("not_found_msg", "El recurso solicitado no existe."),
    ("missing_category_title", "Categoría no encontrada"),
    (
        "missing_category_msg",
        "Puede que la categoría se haya eliminado. Actualiza la página.",
    ),
    ("missing_item_title", "Artículo no encontrado"),
    (
        "missing_item_msg",
        "Puede que el artículo se haya eliminado. Actualiza la página.",
    ),
    ("forbidden_title", "Acceso denegado"),
    ("forbidden_msg", "Solo los administradores pueden hacer eso."),
    ("invalid_form_msg", "No se pudo leer el formulario."),
    ("generic_error_title", "Algo salió mal"),
    ("generic_error_msg", "Inténtalo de nuevo más tarde."),
];
